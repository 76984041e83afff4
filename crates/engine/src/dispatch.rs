//! Upstream dispatch.
//!
//! The [`UpstreamDispatcher`] trait is the engine's seam to the network:
//! tests drive the engine with fakes, and [`HttpDispatcher`] is the real
//! implementation over a shared, pooled reqwest client.

pub use crate::request::RequestPlan;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use toolgate_types::{GatewayError, Method};

/// Default per-call upstream timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// What came back from upstream, before status classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// Executes one prepared request plan.
#[async_trait]
pub trait UpstreamDispatcher: Send + Sync {
    async fn dispatch(&self, plan: &RequestPlan, cancel: &CancellationToken) -> Result<UpstreamResponse, GatewayError>;
}

/// The production dispatcher: one pooled client, one timeout per call.
pub struct HttpDispatcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDispatcher {
    /// Build a dispatcher with the given per-call timeout.
    pub fn new(timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| GatewayError::internal(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { client, timeout })
    }

    fn reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }

    fn header_map(plan: &RequestPlan) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::with_capacity(plan.headers.len());
        for (name, value) in &plan.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| GatewayError::bad_input(format!("invalid header name '{name}'")))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| GatewayError::bad_input(format!("invalid value for header '{name}'")))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    fn classify_send_error(error: reqwest::Error) -> GatewayError {
        if error.is_builder() {
            return GatewayError::bad_input(format!("invalid outbound request: {error}"));
        }
        if error.is_timeout() {
            return GatewayError::upstream_unreachable("upstream request timed out");
        }
        GatewayError::upstream_unreachable(error.to_string())
    }
}

#[async_trait]
impl UpstreamDispatcher for HttpDispatcher {
    async fn dispatch(&self, plan: &RequestPlan, cancel: &CancellationToken) -> Result<UpstreamResponse, GatewayError> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let mut request = self
            .client
            .request(Self::reqwest_method(plan.method), &plan.url)
            .headers(Self::header_map(plan)?)
            .timeout(self.timeout);
        if let Some(body) = &plan.body {
            request = request.body(body.clone());
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
            result = request.send() => result.map_err(Self::classify_send_error)?,
        };

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| GatewayError::upstream_unreachable(format!("failed to read upstream body: {error}")))?;

        Ok(UpstreamResponse { status, body })
    }
}
