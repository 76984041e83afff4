//! Error taxonomy shared across the gateway surfaces.

use thiserror::Error;

/// How much of an upstream response body an error may carry.
const BODY_EXCERPT_LIMIT: usize = 512;

/// The gateway-wide error taxonomy.
///
/// Each kind maps deterministically onto one HTTP status; nothing in the core
/// retries on any of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{message}")]
    BadInput { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotReady { message: String },

    #[error("upstream unreachable: {message}")]
    UpstreamUnreachable { message: String },

    #[error("upstream request failed with status {status}: {body_excerpt}")]
    UpstreamError { status: u16, body_excerpt: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("{message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create a bad-input error.
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadInput { message: message.into() }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create a name-collision error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    /// Create a status-gate error for servers that are not active.
    pub fn not_ready(message: impl Into<String>) -> Self {
        Self::NotReady { message: message.into() }
    }

    /// Create an error for network-level upstream failures.
    pub fn upstream_unreachable(message: impl Into<String>) -> Self {
        Self::UpstreamUnreachable { message: message.into() }
    }

    /// Create an error carrying a non-2xx upstream status and a bounded body
    /// excerpt.
    pub fn upstream_error(status: u16, body: &str) -> Self {
        let mut body_excerpt = body.to_string();
        if body_excerpt.len() > BODY_EXCERPT_LIMIT {
            let mut cut = BODY_EXCERPT_LIMIT;
            while !body_excerpt.is_char_boundary(cut) {
                cut -= 1;
            }
            body_excerpt.truncate(cut);
            body_excerpt.push_str("...");
        }
        Self::UpstreamError { status, body_excerpt }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// The HTTP status this error surfaces as.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::BadInput { .. } => 400,
            GatewayError::NotFound { .. } => 404,
            GatewayError::Conflict { .. } => 400,
            GatewayError::NotReady { .. } => 400,
            GatewayError::UpstreamUnreachable { .. } => 502,
            GatewayError::UpstreamError { .. } => 502,
            // Client-abandoned requests; nginx's non-standard code keeps them
            // distinguishable from genuine 4xx/5xx outcomes in access logs.
            GatewayError::Cancelled => 499,
            GatewayError::Internal { .. } => 500,
        }
    }
}
