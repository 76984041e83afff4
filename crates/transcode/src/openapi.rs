//! Bidirectional OpenAPI 3.0 transcoding.
//!
//! Export turns one stored endpoint into a single-path OpenAPI fragment;
//! import walks every `(path, method)` pair of a document and synthesizes one
//! endpoint per operation. Export followed by import preserves method, path,
//! header set, parameter set, request-body content type, and response status
//! codes; names may change through the `operationId` rule.
//!
//! Local `$ref` references are not resolved on import; referenced schemas
//! fall back to `{"type":"object"}`.

use crate::preflight::collect_preflight_violations;
use crate::TranscodeError;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::str::FromStr;
use toolgate_types::{BodySpec, HeaderSpec, HttpEndpoint, Method, ParamLocation, ParamSpec, ResponseSpec, ValueType};

/// Maximum length of a sanitized path fragment inside a generated name.
const SANITIZED_PATH_LIMIT: usize = 30;

/// Exports a stored endpoint as an OpenAPI 3.0.0 document.
pub fn export_endpoint(endpoint: &HttpEndpoint) -> Value {
    let mut operation = Map::new();
    operation.insert("summary".into(), json!(endpoint.description));
    operation.insert("description".into(), json!(endpoint.description));
    operation.insert("operationId".into(), json!(endpoint.name));

    let mut parameters: Vec<Value> = endpoint
        .parameters
        .iter()
        .map(|param| {
            json!({
                "name": param.name,
                "in": param.location.as_str(),
                "description": param.description,
                "required": param.required,
                "schema": { "type": param.value_type.as_str() },
            })
        })
        .collect();
    parameters.extend(endpoint.headers.iter().map(|header| {
        json!({
            "name": header.name,
            "in": "header",
            "description": header.description,
            "required": header.required,
            "schema": { "type": header.value_type.as_str() },
        })
    }));
    if !parameters.is_empty() {
        operation.insert("parameters".into(), Value::Array(parameters));
    }

    if let Some(body) = &endpoint.request_body {
        operation.insert("requestBody".into(), export_body_container("Request body", body));
    }

    let mut responses = Map::new();
    for response in &endpoint.responses {
        let mut response_object = Map::new();
        response_object.insert("description".into(), json!(response.description));
        if let Some(body) = &response.body {
            response_object.insert("content".into(), export_body_content(body));
        }
        responses.insert(response.status_code.to_string(), Value::Object(response_object));
    }
    operation.insert("responses".into(), Value::Object(responses));

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": endpoint.name,
            "description": endpoint.description,
            "version": "1.0.0",
        },
        "paths": {
            (endpoint.path.clone()): {
                (endpoint.method.as_str().to_ascii_lowercase()): Value::Object(operation),
            }
        }
    })
}

fn export_body_container(description: &str, body: &BodySpec) -> Value {
    json!({
        "description": description,
        "content": export_body_content(body),
    })
}

fn export_body_content(body: &BodySpec) -> Value {
    let schema: Value = serde_json::from_str(&body.schema).unwrap_or_else(|_| json!({ "type": "object" }));

    let mut media_type = Map::new();
    media_type.insert("schema".into(), schema);
    if !body.example.is_empty() {
        let example: Value = serde_json::from_str(&body.example).unwrap_or_else(|_| json!(body.example));
        media_type.insert("example".into(), example);
    }

    json!({ (body.content_type.clone()): Value::Object(media_type) })
}

/// Imports every operation of an OpenAPI document as endpoint records.
///
/// The document must pass preflight validation. Each resulting endpoint is
/// named from the operation's `operationId` when present, otherwise from the
/// import name, the lowercased method, and a sanitized path fragment.
pub fn import_document(import_name: &str, import_description: &str, document: &Value) -> Result<Vec<HttpEndpoint>, TranscodeError> {
    let violations = collect_preflight_violations(document);
    if !violations.is_empty() {
        return Err(TranscodeError::InvalidDocument { violations });
    }

    let mut endpoints = Vec::new();
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Err(TranscodeError::EmptyDocument);
    };

    for (path, path_item) in paths {
        let Some(path_item) = path_item.as_object() else {
            continue;
        };
        for (method_key, operation) in path_item {
            if !matches!(method_key.as_str(), "get" | "post" | "put" | "patch" | "delete") {
                continue;
            }
            let Some(operation) = operation.as_object() else {
                continue;
            };
            let Ok(method) = Method::from_str(method_key) else {
                continue;
            };
            endpoints.push(import_operation(import_name, import_description, path, method, method_key, operation));
        }
    }

    if endpoints.is_empty() {
        return Err(TranscodeError::EmptyDocument);
    }

    Ok(endpoints)
}

fn import_operation(
    import_name: &str,
    import_description: &str,
    path: &str,
    method: Method,
    method_key: &str,
    operation: &Map<String, Value>,
) -> HttpEndpoint {
    let name = operation
        .get("operationId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{import_name}-{method_key}-{}", sanitize_path(path)));

    let mut headers = Vec::new();
    let mut parameters = Vec::new();
    if let Some(declared) = operation.get("parameters").and_then(Value::as_array) {
        for parameter in declared.iter().filter_map(Value::as_object) {
            import_parameter(parameter, &mut headers, &mut parameters);
        }
    }

    let request_body = operation
        .get("requestBody")
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object)
        .and_then(first_content_body);

    let mut responses = Vec::new();
    if let Some(declared) = operation.get("responses").and_then(Value::as_object) {
        for (status, response) in declared {
            let Ok(status_code) = status.parse::<u16>() else {
                continue;
            };
            let Some(response) = response.as_object() else {
                continue;
            };
            responses.push(ResponseSpec {
                status_code,
                description: response.get("description").and_then(Value::as_str).unwrap_or_default().to_string(),
                body: response.get("content").and_then(Value::as_object).and_then(first_content_body),
            });
        }
    }

    let now = Utc::now();
    HttpEndpoint {
        id: String::new(),
        name,
        description: import_description.to_string(),
        method,
        path: path.to_string(),
        headers,
        parameters,
        request_body,
        responses,
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

fn import_parameter(parameter: &Map<String, Value>, headers: &mut Vec<HeaderSpec>, parameters: &mut Vec<ParamSpec>) {
    let Some(name) = parameter.get("name").and_then(Value::as_str) else {
        return;
    };
    let location = parameter.get("in").and_then(Value::as_str).unwrap_or_default();
    let description = parameter.get("description").and_then(Value::as_str).unwrap_or_default().to_string();
    let required = parameter.get("required").and_then(Value::as_bool).unwrap_or(false);
    let value_type = parameter
        .get("schema")
        .and_then(|schema| schema.get("type"))
        .and_then(Value::as_str)
        .map(ValueType::from_name_or_default)
        .unwrap_or_default();

    if location == "header" {
        headers.push(HeaderSpec {
            name: name.to_string(),
            description,
            required,
            value_type,
            default_value: String::new(),
        });
        return;
    }

    let Some(location) = ParamLocation::from_name(location) else {
        return;
    };
    parameters.push(ParamSpec {
        name: name.to_string(),
        description,
        location,
        required,
        value_type,
    });
}

fn first_content_body(content: &Map<String, Value>) -> Option<BodySpec> {
    let (content_type, media_type) = content.iter().next()?;
    let media_type = media_type.as_object()?;

    let schema = media_type
        .get("schema")
        .map(|schema| schema.to_string())
        .unwrap_or_else(|| r#"{"type":"object"}"#.to_string());
    let example = media_type.get("example").map(|example| example.to_string()).unwrap_or_default();

    Some(BodySpec {
        content_type: content_type.clone(),
        schema,
        example,
    })
}

/// Sanitizes a path for use inside a generated endpoint name.
///
/// `/ : { } ? & = *` become `-`; leading and trailing dashes are trimmed and
/// the fragment is truncated.
pub fn sanitize_path(path: &str) -> String {
    let replaced: String = path
        .chars()
        .map(|character| {
            if matches!(character, '/' | ':' | '{' | '}' | '?' | '&' | '=' | '*') {
                '-'
            } else {
                character
            }
        })
        .collect();
    replaced.trim_matches('-').chars().take(SANITIZED_PATH_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use toolgate_types::ResponseSpec;

    fn sample_endpoint() -> HttpEndpoint {
        HttpEndpoint {
            id: "ep-1".into(),
            name: "get-user".into(),
            description: "Fetch one user".into(),
            method: Method::Get,
            path: "https://api.example.com/users/{id}".into(),
            headers: vec![HeaderSpec {
                name: "Accept".into(),
                description: "The Accept header".into(),
                required: true,
                value_type: ValueType::String,
                default_value: "application/json".into(),
            }],
            parameters: vec![ParamSpec {
                name: "id".into(),
                description: "User id".into(),
                location: ParamLocation::Path,
                required: true,
                value_type: ValueType::String,
            }],
            request_body: None,
            responses: vec![ResponseSpec {
                status_code: 200,
                description: "OK".into(),
                body: Some(BodySpec {
                    content_type: "application/json".into(),
                    schema: r#"{"type":"object"}"#.into(),
                    example: String::new(),
                }),
            }],
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn export_produces_a_single_path_document() {
        let document = export_endpoint(&sample_endpoint());

        assert_eq!(document["openapi"], "3.0.0");
        assert_eq!(document["info"]["title"], "get-user");
        let operation = &document["paths"]["https://api.example.com/users/{id}"]["get"];
        assert_eq!(operation["operationId"], "get-user");
        let parameters = operation["parameters"].as_array().expect("parameters");
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[1]["in"], "header");
        assert!(operation["responses"]["200"].is_object());
    }

    #[test]
    fn export_emits_request_body_with_example() {
        let mut endpoint = sample_endpoint();
        endpoint.method = Method::Post;
        endpoint.request_body = Some(BodySpec {
            content_type: "application/json".into(),
            schema: r#"{"type":"object"}"#.into(),
            example: r#"{"name":"John"}"#.into(),
        });

        let document = export_endpoint(&endpoint);
        let media_type = &document["paths"][endpoint.path.as_str()]["post"]["requestBody"]["content"]["application/json"];
        assert_eq!(media_type["schema"]["type"], "object");
        assert_eq!(media_type["example"]["name"], "John");
    }

    #[test]
    fn export_falls_back_to_object_schema_on_unparseable_schema_text() {
        let mut endpoint = sample_endpoint();
        endpoint.method = Method::Post;
        endpoint.request_body = Some(BodySpec {
            content_type: "application/json".into(),
            schema: "definitely not json".into(),
            example: String::new(),
        });

        let document = export_endpoint(&endpoint);
        let schema = &document["paths"][endpoint.path.as_str()]["post"]["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn import_walks_every_path_method_pair() {
        let document = serde_json::json!({
            "openapi": "3.0.0",
            "info": { "title": "users", "version": "1.0.0" },
            "paths": {
                "/users": {
                    "get": { "responses": { "200": { "description": "OK" } } },
                    "post": { "responses": { "201": { "description": "Created" } } },
                },
                "/users/{id}": {
                    "get": {
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": { "200": { "description": "OK" } }
                    }
                }
            }
        });

        let endpoints = import_document("users-api", "imported", &document).expect("import");
        assert_eq!(endpoints.len(), 3);
        assert!(endpoints.iter().all(|endpoint| endpoint.description == "imported"));
        let detail = endpoints
            .iter()
            .find(|endpoint| endpoint.path == "/users/{id}")
            .expect("detail endpoint");
        assert_eq!(detail.parameters.len(), 1);
        assert_eq!(detail.parameters[0].location, ParamLocation::Path);
    }

    #[test]
    fn import_prefers_operation_id_for_names() {
        let document = serde_json::json!({
            "openapi": "3.0.0",
            "paths": {
                "/users": { "get": { "operationId": "listUsers", "responses": {} } }
            }
        });

        let endpoints = import_document("api", "", &document).expect("import");
        assert_eq!(endpoints[0].name, "listUsers");
    }

    #[test]
    fn import_generates_sanitized_names_without_operation_id() {
        let document = serde_json::json!({
            "openapi": "3.0.0",
            "paths": {
                "/users/{id}/profile": { "get": { "responses": {} } }
            }
        });

        let endpoints = import_document("api", "", &document).expect("import");
        assert_eq!(endpoints[0].name, "api-get-users--id--profile");
    }

    #[test]
    fn import_partitions_header_parameters() {
        let document = serde_json::json!({
            "openapi": "3.0.0",
            "paths": {
                "/users": {
                    "get": {
                        "parameters": [
                            { "name": "Accept", "in": "header", "schema": { "type": "string" } },
                            { "name": "page", "in": "query", "schema": { "type": "integer" } },
                            { "name": "session", "in": "cookie" }
                        ],
                        "responses": {}
                    }
                }
            }
        });

        let endpoints = import_document("api", "", &document).expect("import");
        assert_eq!(endpoints[0].headers.len(), 1);
        assert_eq!(endpoints[0].headers[0].name, "Accept");
        assert_eq!(endpoints[0].parameters.len(), 1);
        assert_eq!(endpoints[0].parameters[0].value_type, ValueType::Integer);
    }

    #[test]
    fn import_takes_the_first_request_body_content_entry() {
        let document = serde_json::json!({
            "openapi": "3.0.0",
            "paths": {
                "/users": {
                    "post": {
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "type": "object" },
                                    "example": { "name": "John" }
                                }
                            }
                        },
                        "responses": {}
                    }
                }
            }
        });

        let endpoints = import_document("api", "", &document).expect("import");
        let body = endpoints[0].request_body.as_ref().expect("request body");
        assert_eq!(body.content_type, "application/json");
        assert!(body.example.contains("John"));
    }

    #[test]
    fn import_rejects_documents_without_operations() {
        let document = serde_json::json!({ "openapi": "3.0.0", "paths": {} });
        let error = import_document("api", "", &document).expect_err("empty document");
        assert!(matches!(error, TranscodeError::InvalidDocument { .. }));
    }

    #[test]
    fn import_rejects_swagger_v2() {
        let document = serde_json::json!({ "swagger": "2.0", "paths": { "/u": { "get": {} } } });
        assert!(import_document("api", "", &document).is_err());
    }

    #[test]
    fn sanitize_path_replaces_separators_and_truncates() {
        assert_eq!(sanitize_path("/users/{id}"), "users--id");
        assert_eq!(sanitize_path("/a?b=c&d=e"), "a-b-c-d-e");
        let long = format!("/{}", "x".repeat(64));
        assert_eq!(sanitize_path(&long).len(), 30);
    }

    #[test]
    fn round_trip_preserves_the_essentials() {
        let original = sample_endpoint();
        let document = export_endpoint(&original);
        let imported = import_document("reimport", "", &document).expect("round-trip import");
        assert_eq!(imported.len(), 1);
        let back = &imported[0];

        // operationId carries the original name through the round trip.
        assert_eq!(back.name, original.name);
        assert_eq!(back.method, original.method);
        assert_eq!(back.path, original.path);
        assert_eq!(
            back.headers.iter().map(|header| &header.name).collect::<Vec<_>>(),
            original.headers.iter().map(|header| &header.name).collect::<Vec<_>>()
        );
        assert_eq!(
            back.parameters.iter().map(|param| (&param.name, param.location)).collect::<Vec<_>>(),
            original.parameters.iter().map(|param| (&param.name, param.location)).collect::<Vec<_>>()
        );
        assert_eq!(
            back.responses.iter().map(|response| response.status_code).collect::<Vec<_>>(),
            original.responses.iter().map(|response| response.status_code).collect::<Vec<_>>()
        );
    }

    fn method_strategy() -> impl Strategy<Value = Method> {
        prop_oneof![
            Just(Method::Get),
            Just(Method::Post),
            Just(Method::Put),
            Just(Method::Delete),
            Just(Method::Patch),
        ]
    }

    fn identifier_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,11}"
    }

    prop_compose! {
        fn endpoint_strategy()(
            name in identifier_strategy(),
            method in method_strategy(),
            segment in identifier_strategy(),
            path_param in proptest::option::of(identifier_strategy()),
            query_names in proptest::collection::vec(identifier_strategy(), 0..3),
            header_names in proptest::collection::vec(identifier_strategy(), 0..3),
            has_body in any::<bool>(),
            status_codes in proptest::collection::btree_set(200u16..600, 1..4),
        ) -> HttpEndpoint {
            let mut path = format!("https://api.example.com/{segment}");
            let mut parameters: Vec<ParamSpec> = query_names
                .iter()
                .map(|query_name| ParamSpec {
                    name: format!("q-{query_name}"),
                    description: String::new(),
                    location: ParamLocation::Query,
                    required: false,
                    value_type: ValueType::String,
                })
                .collect();
            if let Some(path_param) = path_param {
                path.push_str(&format!("/{{{path_param}}}"));
                parameters.push(ParamSpec {
                    name: path_param,
                    description: String::new(),
                    location: ParamLocation::Path,
                    required: true,
                    value_type: ValueType::String,
                });
            }
            let headers = header_names
                .iter()
                .map(|header_name| HeaderSpec {
                    name: format!("x-{header_name}"),
                    description: String::new(),
                    required: false,
                    value_type: ValueType::String,
                    default_value: String::new(),
                })
                .collect();
            let request_body = (has_body && method.allows_body()).then(|| BodySpec {
                content_type: "application/json".to_string(),
                schema: r#"{"type":"object"}"#.to_string(),
                example: r#"{"name":"example"}"#.to_string(),
            });
            let responses = status_codes
                .into_iter()
                .map(|status_code| ResponseSpec { status_code, description: "response".into(), body: None })
                .collect();
            let now = Utc::now();
            HttpEndpoint {
                id: String::new(),
                name,
                description: "generated".into(),
                method,
                path,
                headers,
                parameters,
                request_body,
                responses,
                version: 1,
                created_at: now,
                updated_at: now,
            }
        }
    }

    proptest! {
        #[test]
        fn export_import_round_trip_property(original in endpoint_strategy()) {
            let document = export_endpoint(&original);
            let imported = import_document("rt", "", &document).expect("round-trip import");
            prop_assert_eq!(imported.len(), 1);
            let back = &imported[0];

            prop_assert_eq!(back.method, original.method);
            prop_assert_eq!(&back.path, &original.path);

            let mut original_headers: Vec<&String> = original.headers.iter().map(|header| &header.name).collect();
            let mut imported_headers: Vec<&String> = back.headers.iter().map(|header| &header.name).collect();
            original_headers.sort();
            imported_headers.sort();
            prop_assert_eq!(imported_headers, original_headers);

            let mut original_params: Vec<(&String, ParamLocation)> =
                original.parameters.iter().map(|param| (&param.name, param.location)).collect();
            let mut imported_params: Vec<(&String, ParamLocation)> =
                back.parameters.iter().map(|param| (&param.name, param.location)).collect();
            original_params.sort();
            imported_params.sort();
            prop_assert_eq!(imported_params, original_params);

            prop_assert_eq!(
                back.request_body.as_ref().map(|body| &body.content_type),
                original.request_body.as_ref().map(|body| &body.content_type)
            );

            let mut original_codes: Vec<u16> = original.responses.iter().map(|response| response.status_code).collect();
            let mut imported_codes: Vec<u16> = back.responses.iter().map(|response| response.status_code).collect();
            original_codes.sort_unstable();
            imported_codes.sort_unstable();
            prop_assert_eq!(imported_codes, original_codes);
        }
    }
}
