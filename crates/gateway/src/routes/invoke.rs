//! Shared tool-invocation flow for the id- and name-keyed routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use toolgate_types::{GatewayError, McpServer, ServerStatus};
use tracing::{info, warn};

/// Gate checks, registry warm-up, engine dispatch, and result shaping.
///
/// `server` is the freshly-fetched repository record; the registry is
/// (re-)registered from it before lookup so an `active` server that is
/// missing from the registry heals on demand.
pub(crate) async fn run_tool(state: &AppState, server: McpServer, tool_name: &str, raw_body: &[u8]) -> Result<Response, ApiError> {
    if server.status != ServerStatus::Active {
        return Err(GatewayError::not_ready("MCP Server is not active").into());
    }
    if !server.allows_tool(tool_name) {
        return Err(GatewayError::not_found("Tool not found or not allowed").into());
    }

    state.registry.register(&server)?;
    let cached = state
        .registry
        .lookup_by_id(&server.id)?
        .ok_or_else(|| GatewayError::internal("server missing from registry after registration"))?;
    let tool = cached
        .tool(tool_name)
        .ok_or_else(|| GatewayError::not_found("Tool not found or not allowed"))?;

    let document = parse_params(raw_body);
    info!(server_name = %server.name, tool = %tool_name, "executing tool request");

    let cancel = state.shutdown.child_token();
    let result = state.engine.invoke(tool, document, &cancel).await?;

    Ok(shape_result(result))
}

/// Lenient parameter parsing: an empty or unparseable body is an empty
/// parameter set, matching how agents commonly omit it.
fn parse_params(raw_body: &[u8]) -> Value {
    if raw_body.is_empty() {
        return json!({});
    }
    match serde_json::from_slice(raw_body) {
        Ok(document) => document,
        Err(error) => {
            warn!(%error, "could not parse invocation parameters; using an empty set");
            json!({})
        }
    }
}

/// JSON passthrough when the engine result parses; text envelope otherwise.
fn shape_result(result: String) -> Response {
    match serde_json::from_str::<Value>(&result) {
        Ok(parsed) => Json(parsed).into_response(),
        Err(_) => Json(json!({ "result": result })).into_response(),
    }
}
