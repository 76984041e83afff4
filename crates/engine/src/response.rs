//! Response shaping.
//!
//! Interprets a tool's response template as a dotted-path interpolation
//! dialect: `{{.a.b.c}}` resolves against the parsed upstream JSON, numeric
//! segments index arrays, and missing paths interpolate to the empty string.
//! An empty template passes the raw upstream body through untouched.

use serde_json::Value;
use toolgate_types::GatewayError;

/// Renders the response template over the upstream body.
pub fn render(template: &str, upstream_body: &str) -> Result<String, GatewayError> {
    if template.is_empty() {
        return Ok(upstream_body.to_string());
    }

    let parsed: Value = serde_json::from_str(upstream_body)
        .map_err(|_| GatewayError::internal("response template requires a JSON upstream body"))?;

    Ok(interpolate(template, &parsed))
}

fn interpolate(template: &str, document: &Value) -> String {
    let mut output = String::with_capacity(template.len());
    let mut remainder = template;

    while let Some(start) = remainder.find("{{") {
        output.push_str(&remainder[..start]);
        let after_start = &remainder[start + 2..];
        let Some(end) = after_start.find("}}") else {
            // Unterminated expression; emit the rest literally.
            output.push_str(&remainder[start..]);
            return output;
        };

        let expression = after_start[..end].trim();
        output.push_str(&resolve_expression(expression, document));
        remainder = &after_start[end + 2..];
    }

    output.push_str(remainder);
    output
}

fn resolve_expression(expression: &str, document: &Value) -> String {
    let Some(path) = expression.strip_prefix('.') else {
        // Not a path expression; richer constructs are not part of the
        // dialect and interpolate to nothing.
        return String::new();
    };

    match resolve_path(path, document) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn resolve_path<'doc>(path: &str, document: &'doc Value) -> Option<&'doc Value> {
    let mut current = document;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(entries) => entries.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_template_returns_the_raw_body() {
        let rendered = render("", "not even json").expect("render");
        assert_eq!(rendered, "not even json");
    }

    #[test]
    fn dotted_paths_resolve_nested_objects() {
        let body = json!({"user": {"name": "Ada", "id": 7}}).to_string();
        let rendered = render("{{.user.name}} has id {{.user.id}}", &body).expect("render");
        assert_eq!(rendered, "Ada has id 7");
    }

    #[test]
    fn numeric_segments_index_arrays() {
        let body = json!({"results": [{"email": "a@example.com"}, {"email": "b@example.com"}]}).to_string();
        let rendered = render("second: {{.results.1.email}}", &body).expect("render");
        assert_eq!(rendered, "second: b@example.com");
    }

    #[test]
    fn missing_paths_interpolate_to_empty() {
        let body = json!({"a": 1}).to_string();
        let rendered = render("[{{.missing.path}}]", &body).expect("render");
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn null_values_interpolate_to_empty() {
        let body = json!({"a": null}).to_string();
        assert_eq!(render("[{{.a}}]", &body).expect("render"), "[]");
    }

    #[test]
    fn non_string_values_use_their_json_rendering() {
        let body = json!({"count": 3, "flags": [true, false]}).to_string();
        let rendered = render("{{.count}} {{.flags}}", &body).expect("render");
        assert_eq!(rendered, "3 [true,false]");
    }

    #[test]
    fn unterminated_expression_is_left_literal() {
        let body = json!({"a": 1}).to_string();
        assert_eq!(render("x {{.a", &body).expect("render"), "x {{.a");
    }

    #[test]
    fn templates_over_non_json_bodies_are_internal_errors() {
        let error = render("{{.a}}", "plain text").expect_err("non-json body");
        assert_eq!(error.http_status(), 500);
    }

    #[test]
    fn markdown_style_templates_assemble_reports() {
        let body = json!({
            "results": [{
                "name": {"first": "Ada", "last": "Lovelace"},
                "email": "ada@example.com",
                "location": {"city": "London", "country": "UK"}
            }]
        })
        .to_string();

        let template = "# User Information\n- **Name**: {{.results.0.name.first}} {{.results.0.name.last}}\n- **Email**: {{.results.0.email}}\n- **Location**: {{.results.0.location.city}}, {{.results.0.location.country}}";
        let rendered = render(template, &body).expect("render");
        assert!(rendered.contains("**Name**: Ada Lovelace"));
        assert!(rendered.contains("**Location**: London, UK"));
    }
}
