//! Shared application state.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolgate_catalog::ServerRegistry;
use toolgate_engine::InvocationEngine;
use toolgate_store::{EndpointRepository, ServerRepository};

/// Everything the route handlers need.
///
/// Repositories are trait objects so the same router serves the in-memory
/// and Postgres backends; the registry and engine are shared across all
/// inbound requests.
#[derive(Clone)]
pub struct AppState {
    pub endpoints: Arc<dyn EndpointRepository>,
    pub servers: Arc<dyn ServerRepository>,
    pub registry: Arc<ServerRegistry>,
    pub engine: InvocationEngine,
    /// Root token; each invocation runs under a child so server shutdown
    /// aborts in-flight upstream calls.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(endpoints: Arc<dyn EndpointRepository>, servers: Arc<dyn ServerRepository>, engine: InvocationEngine) -> Self {
        Self {
            endpoints,
            servers,
            registry: Arc::new(ServerRegistry::new()),
            engine,
            shutdown: CancellationToken::new(),
        }
    }
}
