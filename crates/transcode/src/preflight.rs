//! OpenAPI document preflight validation.
//!
//! Lightweight, reusable validation for OpenAPI sources before endpoint
//! generation is attempted.

use serde_json::Value;

/// A structured preflight validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightViolation {
    /// JSON path where the violation occurred.
    pub path: String,
    /// Stable rule identifier for machine-readable handling.
    pub rule: String,
    /// Human-readable message.
    pub message: String,
}

impl PreflightViolation {
    /// Creates a new violation.
    pub fn new(path: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Converts this violation into a JSON object for error payloads.
    pub fn to_json_value(&self) -> Value {
        serde_json::json!({
            "path": self.path,
            "rule": self.rule,
            "message": self.message,
        })
    }
}

/// Validates an OpenAPI document for basic import readiness.
///
/// The preflight ensures the document declares a 3.x `openapi` version, that
/// `paths` exists and is an object, and that at least one HTTP operation
/// exists under it.
pub fn collect_preflight_violations(document: &Value) -> Vec<PreflightViolation> {
    let mut violations = Vec::new();

    match document.get("openapi") {
        Some(Value::String(version)) if version.starts_with("3.") => {}
        Some(Value::String(version)) => violations.push(PreflightViolation::new(
            "$.openapi",
            "openapi_version",
            format!("unsupported OpenAPI version '{version}'; expected a 3.x document"),
        )),
        Some(_) => violations.push(PreflightViolation::new(
            "$.openapi",
            "openapi_version",
            "field `openapi` must be a string and start with `3.`",
        )),
        None => {
            if let Some(swagger_version) = document.get("swagger").and_then(Value::as_str) {
                violations.push(PreflightViolation::new(
                    "$.swagger",
                    "openapi_version",
                    format!("Swagger/OpenAPI 2.x document detected ('{swagger_version}'); OpenAPI 3.x is required"),
                ));
            } else {
                violations.push(PreflightViolation::new(
                    "$.openapi",
                    "openapi_version",
                    "missing required `openapi` field; expected an OpenAPI 3.x document",
                ));
            }
        }
    }

    let paths = match document.get("paths") {
        Some(Value::Object(paths)) => Some(paths),
        Some(_) => {
            violations.push(PreflightViolation::new("$.paths", "paths_type", "field `paths` must be an object"));
            None
        }
        None => {
            violations.push(PreflightViolation::new("$.paths", "paths_required", "missing required `paths` object"));
            None
        }
    };

    if let Some(paths) = paths {
        let operation_count: usize = paths
            .values()
            .filter_map(Value::as_object)
            .map(|path_item| {
                path_item
                    .keys()
                    .filter(|key| matches!(key.as_str(), "get" | "post" | "put" | "patch" | "delete"))
                    .count()
            })
            .sum();
        if operation_count == 0 {
            violations.push(PreflightViolation::new(
                "$.paths",
                "operations_presence",
                "no HTTP operations were found under `paths`",
            ));
        }
    }

    violations
}
