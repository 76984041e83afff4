//! MCP server administration routes, keyed by id.

use super::invoke::run_tool;
use crate::error::{map_not_found, ApiError};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use toolgate_catalog::{compose_server, validate_server_name};
use toolgate_types::{McpServer, ServerStatus};
use tracing::info;

const SERVER_NOT_FOUND: &str = "MCP Server not found";

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<McpServer>>, ApiError> {
    let servers = state.servers.get_all().await?;
    Ok(Json(servers))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<McpServer>, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    Ok(Json(server))
}

/// Payload for composing a server over stored endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub http_ids: Vec<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateServerRequest>,
) -> Result<(StatusCode, Json<McpServer>), ApiError> {
    let server = compose_server(
        &request.name,
        &request.description,
        &request.http_ids,
        state.endpoints.as_ref(),
        state.servers.as_ref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(server)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut server): Json<McpServer>,
) -> Result<Json<McpServer>, ApiError> {
    server.id = id.clone();

    let existing = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    if existing.name != server.name {
        validate_server_name(&server.name, &id, state.servers.as_ref()).await?;
    }

    state
        .servers
        .update(&mut server)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    Ok(Json(server))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state
        .servers
        .delete(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    state.registry.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn versions(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<u32>>, ApiError> {
    let versions = state
        .servers
        .versions(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    Ok(Json(versions))
}

pub async fn by_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, u32)>,
) -> Result<Json<McpServer>, ApiError> {
    let server = state
        .servers
        .get_by_version(&id, version)
        .await
        .map_err(|error| map_not_found(error, "MCP Server or version not found"))?;
    Ok(Json(server))
}

pub async fn register(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    state.registry.register(&server)?;
    Ok(Json(json!({ "message": "MCP Server registered successfully" })))
}

/// Activation: persist the status flip first, then make sure the registry
/// holds the server. A crash in between heals on the next lookup because
/// every invocation path re-registers active servers fetched from storage.
pub async fn activate(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;

    let activated = state
        .servers
        .update_status(&id, ServerStatus::Active)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    state.registry.register(&activated)?;

    info!(server_id = %id, server_name = %activated.name, "activated MCP server");
    Ok(Json(json!({ "message": "MCP Server activated successfully" })))
}

/// Deactivation flips the stored status and leaves the registry entry in
/// place; the status gate rejects subsequent traffic.
pub async fn deactivate(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    if server.status != ServerStatus::Active {
        return Err(toolgate_types::GatewayError::not_ready("MCP Server is not active").into());
    }

    let deactivated = state
        .servers
        .update_status(&id, ServerStatus::Inactive)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    state.registry.register(&deactivated)?;

    info!(server_id = %id, server_name = %deactivated.name, "deactivated MCP server");
    Ok(Json(json!({ "message": "MCP Server deactivated successfully" })))
}

pub async fn invoke_tool(
    State(state): State<AppState>,
    Path((id, tool)): Path<(String, String)>,
    raw_body: Bytes,
) -> Result<Response, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    run_tool(&state, server, &tool, &raw_body).await
}

/// Lists the stored endpoints a server's tools were composed from, matched
/// by name, method, and URL.
pub async fn http_interfaces(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    let all_endpoints = state.endpoints.get_all().await?;

    let matched: Vec<_> = all_endpoints
        .into_iter()
        .filter(|endpoint| {
            server.tools.iter().any(|tool| {
                tool.name == endpoint.name
                    && tool.request_template.method == endpoint.method
                    && tool.request_template.url == endpoint.path
            })
        })
        .collect();

    Ok(Json(json!(matched)))
}

/// Payload for name validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateNameRequest {
    pub name: String,
    #[serde(default)]
    pub exclude_id: String,
}

pub async fn validate_name(
    State(state): State<AppState>,
    Json(request): Json<ValidateNameRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match validate_server_name(&request.name, &request.exclude_id, state.servers.as_ref()).await {
        Ok(()) => Ok(Json(json!({ "valid": true }))),
        Err(error) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": error.to_string(), "valid": false })),
        )),
    }
}

/// A human-oriented integration guide for one server's tools.
pub async fn usage_guide(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;

    let tools_usage: Vec<Value> = server.tools.iter().map(|tool| tool_usage_entry(&server.name, tool)).collect();

    Ok(Json(json!({
        "server_name": server.name,
        "server_description": server.description,
        "overview": format!(
            "This MCP Server provides {} tools that can be accessed using the Model Context Protocol standard. \
             The server endpoint is available at /api/mcp-server/{}/",
            server.tools.len(),
            server.name,
        ),
        "tools_usage": tools_usage,
        "mcp_protocol_info": {
            "server_endpoints": {
                "tools_metadata": format!("/api/mcp-server/{}/tools", server.name),
                "resources_metadata": format!("/api/mcp-server/{}/resources", server.name),
                "prompts_metadata": format!("/api/mcp-server/{}/prompts", server.name),
                "tool_invocation": format!("/api/mcp-server/{}/tools/{{tool_name}}", server.name),
            },
            "request_format": {
                "content_type": "application/json",
                "parameters": "Tool-specific parameters according to the tool's schema",
            },
            "response_format": {
                "success": "JSON or text response from the tool",
                "error": "Error object with message",
                "content_type": "application/json",
            },
        },
        "integration_steps": [
            "1. Retrieve tool metadata from the /tools endpoint",
            "2. Examine tool requirements and parameters",
            "3. Call tool endpoints with appropriate parameters",
            "4. Process the tool response according to your application needs",
        ],
    })))
}

fn tool_usage_entry(server_name: &str, tool: &toolgate_types::Tool) -> Value {
    let path_parameters = toolgate_types::template::path_placeholder_names(&tool.request_template.url);
    let mut parameter_descriptions: Vec<Value> = path_parameters
        .iter()
        .map(|parameter| {
            json!({
                "name": parameter,
                "type": "string",
                "description": format!("Path parameter '{parameter}'"),
                "required": true,
            })
        })
        .collect();
    if tool.request_template.method.templates_body() {
        parameter_descriptions.push(json!({
            "name": "body",
            "type": "object",
            "description": "Request body data",
            "required": true,
        }));
    }

    let mut example_request = serde_json::Map::new();
    let mut example_body = serde_json::Map::new();
    for parameter in &path_parameters {
        example_body.insert(parameter.clone(), json!(format!("<{parameter}>")));
    }
    if tool.request_template.method.templates_body() {
        example_body.insert("example_field".into(), json!("value"));
    }
    example_request.insert("body".into(), Value::Object(example_body));

    json!({
        "name": tool.name,
        "description": tool.description,
        "endpoint": format!("/api/mcp-server/{server_name}/tools/{}", tool.name),
        // Invocation is always POST, whatever the upstream method is.
        "method": "POST",
        "parameters": parameter_descriptions,
        "example_request": Value::Object(example_request),
        "notes": [
            "All tools are invoked via POST request regardless of the underlying HTTP method",
            "Parameters should be passed as a JSON object in the request body",
            "Path parameters from the tool URL should be included in the request body",
        ],
    })
}

/// MCP compliance metadata for one server.
pub async fn metadata(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = state
        .servers
        .get_by_id(&id)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;

    let tools_summary: Vec<Value> = server
        .tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "method": tool.request_template.method,
                "url": tool.request_template.url,
            })
        })
        .collect();

    Ok(Json(json!({
        "id": server.id,
        "name": server.name,
        "description": server.description,
        "version": server.version,
        "status": server.status,
        "mcp_compliance": "2025-03-26",
        "endpoints": {
            "tools": format!("/api/mcp-server/{}/tools", server.name),
            "resources": format!("/api/mcp-server/{}/resources", server.name),
            "prompts": format!("/api/mcp-server/{}/prompts", server.name),
        },
        "capabilities": {
            "tools": !server.tools.is_empty(),
            "resources": false,
            "prompts": false,
        },
        "created_at": server.created_at,
        "updated_at": server.updated_at,
        "tools_summary": tools_summary,
    })))
}
