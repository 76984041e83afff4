//! Tool-descriptor ingestion dialects.
//!
//! This crate turns operator input into [`toolgate_types::HttpEndpoint`]
//! records: shell-quoted curl invocations ([`curl`]) and OpenAPI 3.0
//! documents ([`openapi`], with [`preflight`] validation), plus the reverse
//! direction that exports a stored endpoint as an OpenAPI fragment.

pub mod curl;
pub mod openapi;
pub mod preflight;
pub mod shell;

use preflight::PreflightViolation;
use thiserror::Error;

/// Failures while turning operator input into endpoint records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranscodeError {
    #[error("no URL found in curl command")]
    MissingUrl,

    #[error("flag '{flag}' is missing its value")]
    MissingFlagValue { flag: String },

    #[error("unsupported HTTP method '{method}'")]
    UnsupportedMethod { method: String },

    #[error("OpenAPI document failed preflight validation: {}", summarize_violations(.violations))]
    InvalidDocument { violations: Vec<PreflightViolation> },

    #[error("no valid HTTP interfaces found in OpenAPI spec")]
    EmptyDocument,
}

impl TranscodeError {
    /// Create an error for a flag that appeared without its value.
    pub fn missing_flag_value(flag: impl Into<String>) -> Self {
        Self::MissingFlagValue { flag: flag.into() }
    }

    /// Create an error for an unknown HTTP method token.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod { method: method.into() }
    }
}

fn summarize_violations(violations: &[PreflightViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{} ({})", violation.message, violation.path))
        .collect::<Vec<_>>()
        .join("; ")
}
