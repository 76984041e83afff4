//! The tool-invocation engine.
//!
//! Turns an agent's JSON parameter document plus a stored [`Tool`] into one
//! outbound HTTP request and shapes the upstream response before it is
//! returned. Plan construction ([`params`], [`request`]) is synchronous and
//! side-effect free; the outbound call behind [`dispatch::UpstreamDispatcher`]
//! is the engine's only I/O.

pub mod dispatch;
pub mod params;
pub mod request;
pub mod response;

use dispatch::UpstreamDispatcher;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolgate_types::{GatewayError, Tool};
use tracing::{debug, info};

/// Executes tool invocations against upstream services.
///
/// Concurrent invocations share one dispatcher; the engine itself holds no
/// mutable state.
#[derive(Clone)]
pub struct InvocationEngine {
    dispatcher: Arc<dyn UpstreamDispatcher>,
}

impl InvocationEngine {
    /// Create an engine over the given dispatcher.
    pub fn new(dispatcher: Arc<dyn UpstreamDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Invoke `tool` with the raw parameter document an agent posted.
    ///
    /// Steps run strictly in order: parameter demux, URL substitution, body
    /// construction, header assembly, query composition, upstream dispatch,
    /// response shaping. Cancelling `cancel` aborts the outbound call.
    pub async fn invoke(&self, tool: &Tool, document: Value, cancel: &CancellationToken) -> Result<String, GatewayError> {
        let parameters = params::demux(document);
        let plan = request::build_plan(tool, parameters)?;

        info!(
            tool = %tool.name,
            method = %plan.method,
            url = %plan.url,
            "dispatching tool invocation"
        );
        let upstream = self.dispatcher.dispatch(&plan, cancel).await?;
        debug!(tool = %tool.name, status = upstream.status, "upstream responded");

        if !(200..300).contains(&upstream.status) {
            return Err(GatewayError::upstream_error(upstream.status, &upstream.body));
        }

        response::render(&tool.response_template.body, &upstream.body)
    }
}
