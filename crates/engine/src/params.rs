//! Parameter demultiplexing.
//!
//! Splits an agent's parameter document into caller headers, an explicit
//! body, and the residual map that feeds URL substitution and query
//! composition. The split is a partition: keys routed to `headers` or `body`
//! never appear in the residual.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// The demultiplexed invocation input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationParams {
    /// Caller-supplied headers; they overlay template headers.
    pub headers: IndexMap<String, String>,
    /// Explicit body, serialized verbatim when present.
    pub body: Option<Value>,
    /// Everything else: consumed by URL templating first, appended as query
    /// parameters afterwards, and substituted into body templates.
    pub residual: Map<String, Value>,
}

/// Splits a parameter document per the invocation envelope.
///
/// Documents carrying top-level `headers` and/or `body` keys use the
/// canonical envelope; any other object is the legacy flat form and becomes
/// the residual map wholesale. Non-object documents yield empty parameters.
pub fn demux(document: Value) -> InvocationParams {
    let Value::Object(mut document) = document else {
        return InvocationParams::default();
    };

    if !document.contains_key("headers") && !document.contains_key("body") {
        return InvocationParams {
            headers: IndexMap::new(),
            body: None,
            residual: document,
        };
    }

    let headers = match document.remove("headers") {
        Some(Value::Object(entries)) => entries
            .into_iter()
            .map(|(name, value)| (name, stringify(&value)))
            .collect(),
        // A non-object headers value is meaningless; drop it rather than
        // letting it leak into the query string.
        Some(_) | None => IndexMap::new(),
    };

    let body = match document.remove("body") {
        Some(Value::Object(body)) => Some(Value::Object(body)),
        Some(Value::String(raw)) if !raw.is_empty() => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => Some(serde_json::json!({ "raw": raw })),
        },
        Some(_) | None => None,
    };

    InvocationParams {
        headers,
        body,
        residual: document,
    }
}

/// Stringifies a parameter value for use in URLs and headers.
///
/// Strings pass through unquoted; everything else uses its JSON rendering.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
