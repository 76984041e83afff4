//! Router assembly.

pub mod endpoints;
mod invoke;
pub mod mcp;
pub mod servers;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the full API router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/api/version", get(version))
        // HTTP interface lifecycle and ingestion.
        .route("/api/http-interfaces", get(endpoints::list).post(endpoints::create))
        .route(
            "/api/http-interfaces/{id}",
            get(endpoints::get_one).put(endpoints::update).delete(endpoints::remove),
        )
        .route("/api/http-interfaces/{id}/versions", get(endpoints::versions))
        .route("/api/http-interfaces/{id}/versions/{version}", get(endpoints::by_version))
        .route("/api/http-interfaces/{id}/openapi", get(endpoints::export_openapi))
        .route("/api/http-interfaces/from-curl", post(endpoints::from_curl))
        .route("/api/http-interfaces/from-openapi", post(endpoints::from_openapi))
        // MCP server administration (by id).
        .route("/api/mcp-servers", get(servers::list).post(servers::create))
        .route(
            "/api/mcp-servers/{id}",
            get(servers::get_one).put(servers::update).delete(servers::remove),
        )
        .route("/api/mcp-servers/{id}/versions", get(servers::versions))
        .route("/api/mcp-servers/{id}/versions/{version}", get(servers::by_version))
        .route("/api/mcp-servers/{id}/register", post(servers::register))
        .route("/api/mcp-servers/{id}/activate", post(servers::activate))
        .route("/api/mcp-servers/{id}/deactivate", post(servers::deactivate))
        .route("/api/mcp-servers/{id}/tools/{tool}", post(servers::invoke_tool))
        .route("/api/mcp-servers/{id}/http-interfaces", get(servers::http_interfaces))
        .route("/api/mcp-servers/{id}/metadata", get(servers::metadata))
        .route("/api/mcp-servers/{id}/usage-guide", get(servers::usage_guide))
        .route("/api/mcp-servers/validate-name", post(servers::validate_name))
        // MCP discovery and invocation (by public name).
        .route("/api/mcp-server/{name}/tools", get(mcp::tools))
        .route("/api/mcp-server/{name}/resources", get(mcp::resources))
        .route("/api/mcp-server/{name}/prompts", get(mcp::prompts))
        .route("/api/mcp-server/{name}/tools/{tool}", post(mcp::invoke_tool))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to toolgate", "version": env!("CARGO_PKG_VERSION") }))
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({ "name": "toolgate", "version": env!("CARGO_PKG_VERSION") }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP", "time": chrono::Utc::now().to_rfc3339() }))
}
