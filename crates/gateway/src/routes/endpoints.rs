//! HTTP interface lifecycle and ingestion routes.

use crate::error::{map_not_found, ApiError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use toolgate_transcode::{curl, openapi};
use toolgate_types::{GatewayError, HttpEndpoint};
use tracing::info;

const ENDPOINT_NOT_FOUND: &str = "HTTP interface not found";

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<HttpEndpoint>>, ApiError> {
    let endpoints = state.endpoints.get_all().await?;
    Ok(Json(endpoints))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<HttpEndpoint>, ApiError> {
    let endpoint = state
        .endpoints
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, ENDPOINT_NOT_FOUND))?;
    Ok(Json(endpoint))
}

pub async fn create(
    State(state): State<AppState>,
    Json(mut endpoint): Json<HttpEndpoint>,
) -> Result<(StatusCode, Json<HttpEndpoint>), ApiError> {
    if endpoint.name.is_empty() {
        return Err(GatewayError::bad_input("name cannot be empty").into());
    }

    state.endpoints.create(&mut endpoint).await?;
    info!(endpoint_id = %endpoint.id, endpoint_name = %endpoint.name, "created HTTP interface");
    Ok((StatusCode::CREATED, Json(endpoint)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut endpoint): Json<HttpEndpoint>,
) -> Result<Json<HttpEndpoint>, ApiError> {
    endpoint.id = id;
    state
        .endpoints
        .update(&mut endpoint)
        .await
        .map_err(|error| map_not_found(error, ENDPOINT_NOT_FOUND))?;
    Ok(Json(endpoint))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state
        .endpoints
        .delete(&id)
        .await
        .map_err(|error| map_not_found(error, ENDPOINT_NOT_FOUND))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn versions(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<u32>>, ApiError> {
    let versions = state
        .endpoints
        .versions(&id)
        .await
        .map_err(|error| map_not_found(error, ENDPOINT_NOT_FOUND))?;
    Ok(Json(versions))
}

pub async fn by_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, u32)>,
) -> Result<Json<HttpEndpoint>, ApiError> {
    let endpoint = state
        .endpoints
        .get_by_version(&id, version)
        .await
        .map_err(|error| map_not_found(error, "HTTP interface version not found"))?;
    Ok(Json(endpoint))
}

pub async fn export_openapi(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let endpoint = state
        .endpoints
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, ENDPOINT_NOT_FOUND))?;
    Ok(Json(openapi::export_endpoint(&endpoint)))
}

/// Payload for curl ingestion.
#[derive(Debug, Deserialize)]
pub struct CurlIngestRequest {
    pub command: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn from_curl(
    State(state): State<AppState>,
    Json(request): Json<CurlIngestRequest>,
) -> Result<(StatusCode, Json<HttpEndpoint>), ApiError> {
    let mut endpoint = curl::parse_curl_command(&request.command, &request.name, &request.description)
        .map_err(|error| GatewayError::bad_input(format!("Failed to parse curl command: {error}")))?;

    state.endpoints.create(&mut endpoint).await?;
    info!(endpoint_id = %endpoint.id, endpoint_name = %endpoint.name, "ingested curl command");
    Ok((StatusCode::CREATED, Json(endpoint)))
}

/// Payload for OpenAPI ingestion.
///
/// `spec` is usually the parsed document; a string is accepted too and
/// parsed as YAML (which subsumes JSON).
#[derive(Debug, Deserialize)]
pub struct OpenApiIngestRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub spec: Value,
}

pub async fn from_openapi(
    State(state): State<AppState>,
    Json(request): Json<OpenApiIngestRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let document = match request.spec {
        Value::String(raw) => serde_yaml::from_str::<Value>(&raw)
            .map_err(|error| GatewayError::bad_input(format!("spec is not valid JSON or YAML: {error}")))?,
        other => other,
    };

    let name = if request.name.is_empty() {
        document
            .pointer("/info/title")
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .unwrap_or("api")
            .to_string()
    } else {
        request.name
    };
    let description = if request.description.is_empty() {
        document
            .pointer("/info/description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    } else {
        request.description
    };

    let endpoints = openapi::import_document(&name, &description, &document)
        .map_err(|error| GatewayError::bad_input(format!("Failed to parse OpenAPI spec: {error}")))?;

    let mut saved = Vec::with_capacity(endpoints.len());
    for mut endpoint in endpoints {
        state.endpoints.create(&mut endpoint).await?;
        saved.push(endpoint);
    }

    info!(count = saved.len(), import_name = %name, "imported OpenAPI document");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Successfully created {} HTTP interfaces from OpenAPI spec", saved.len()),
            "interfaces": saved,
        })),
    ))
}
