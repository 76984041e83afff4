//! The MCP-compliant discovery and invocation surface, keyed by server name.

use super::invoke::run_tool;
use crate::error::{map_not_found, ApiError};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde_json::{json, Value};
use toolgate_catalog::discovery;
use toolgate_types::{GatewayError, McpServer, ServerStatus};

const SERVER_NOT_FOUND: &str = "MCP Server not found";

/// Fetches a server by public name and enforces the activation gate.
async fn active_server(state: &AppState, name: &str) -> Result<McpServer, ApiError> {
    let server = state
        .servers
        .get_by_name(name)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    if server.status != ServerStatus::Active {
        return Err(GatewayError::not_ready("MCP Server is not active").into());
    }
    Ok(server)
}

pub async fn tools(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Value>, ApiError> {
    let server = active_server(&state, &name).await?;
    // Keep the hot-path cache warm for the invocations that follow.
    state.registry.register(&server)?;
    Ok(Json(discovery::tools_listing(&server)))
}

/// Reserved for future expansion; always an empty array in this core.
pub async fn resources(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Value>, ApiError> {
    active_server(&state, &name).await?;
    Ok(Json(json!([])))
}

/// Reserved for future expansion; always an empty array in this core.
pub async fn prompts(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Value>, ApiError> {
    active_server(&state, &name).await?;
    Ok(Json(json!([])))
}

pub async fn invoke_tool(
    State(state): State<AppState>,
    Path((name, tool)): Path<(String, String)>,
    raw_body: Bytes,
) -> Result<Response, ApiError> {
    let server = state
        .servers
        .get_by_name(&name)
        .await
        .map_err(|error| map_not_found(error, SERVER_NOT_FOUND))?;
    run_tool(&state, server, &tool, &raw_body).await
}
