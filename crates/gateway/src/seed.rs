//! Example endpoint seeding for fresh installs.

use chrono::Utc;
use std::sync::Arc;
use toolgate_store::EndpointRepository;
use toolgate_types::{BodySpec, HttpEndpoint, Method, ParamLocation, ParamSpec, ResponseSpec, ValueType};
use tracing::warn;

/// Adds a couple of example HTTP interfaces so a fresh gateway has something
/// to compose into a server.
pub async fn seed_examples(endpoints: &Arc<dyn EndpointRepository>) {
    for mut endpoint in [random_user_endpoint(), weather_endpoint()] {
        if let Err(error) = endpoints.create(&mut endpoint).await {
            warn!(%error, endpoint_name = %endpoint.name, "failed to seed example HTTP interface");
        }
    }
}

fn random_user_endpoint() -> HttpEndpoint {
    let now = Utc::now();
    HttpEndpoint {
        id: String::new(),
        name: "get-user".into(),
        description: "Get random user information".into(),
        method: Method::Get,
        path: "https://randomuser.me/api/".into(),
        headers: vec![],
        parameters: vec![],
        request_body: None,
        responses: vec![ResponseSpec {
            status_code: 200,
            description: "Random user information".into(),
            body: Some(BodySpec {
                content_type: "application/json".into(),
                schema: r#"{"type":"object"}"#.into(),
                example: r#"{"results":[{"name":{"first":"John","last":"Doe"},"email":"john.doe@example.com","location":{"city":"New York","country":"USA"},"phone":"123-456-7890"}]}"#.into(),
            }),
        }],
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

fn weather_endpoint() -> HttpEndpoint {
    let now = Utc::now();
    HttpEndpoint {
        id: String::new(),
        name: "get-weather".into(),
        description: "Get weather information for a location".into(),
        method: Method::Get,
        path: "https://api.openweathermap.org/data/2.5/weather".into(),
        headers: vec![],
        parameters: vec![
            ParamSpec {
                name: "q".into(),
                description: "City name".into(),
                location: ParamLocation::Query,
                required: true,
                value_type: ValueType::String,
            },
            ParamSpec {
                name: "appid".into(),
                description: "API key".into(),
                location: ParamLocation::Query,
                required: true,
                value_type: ValueType::String,
            },
        ],
        request_body: None,
        responses: vec![ResponseSpec {
            status_code: 200,
            description: "Weather information".into(),
            body: Some(BodySpec {
                content_type: "application/json".into(),
                schema: r#"{"type":"object"}"#.into(),
                example: r#"{"weather":[{"main":"Clear","description":"clear sky"}],"main":{"temp":293.15,"humidity":75}}"#.into(),
            }),
        }],
        version: 0,
        created_at: now,
        updated_at: now,
    }
}
