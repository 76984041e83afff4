//! Outbound request-plan construction.
//!
//! Builds the concrete method, URL, headers, and body for one invocation.
//! Everything here is pure; the plan is handed to a dispatcher afterwards.

use crate::params::{stringify, InvocationParams};
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use toolgate_types::template::{path_placeholder_names, placeholder_names};
use toolgate_types::{GatewayError, Method, Tool};

/// A fully-constructed outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: Method,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<String>,
}

/// Builds the request plan for `tool` from demultiplexed parameters.
pub fn build_plan(tool: &Tool, mut params: InvocationParams) -> Result<RequestPlan, GatewayError> {
    let template = &tool.request_template;

    let (url, consumed) = substitute_url(&template.url, &mut params)?;
    let body = build_body(template.method, &template.body, &params, &consumed);
    let headers = assemble_headers(&template.headers, &params.headers, body.is_some());
    let url = append_query(url, &params.residual);

    Ok(RequestPlan {
        method: template.method,
        url,
        headers,
        body,
    })
}

/// Substitutes `{k}` tokens in the URL template.
///
/// Values come from the residual map first (and are consumed, so they are
/// not reused as query parameters), then from the explicit body. Tokens left
/// unresolved in the path portion are an error; tokens in the query portion
/// stay literal so callers can keep optional segments.
fn substitute_url(template: &str, params: &mut InvocationParams) -> Result<(String, Map<String, Value>), GatewayError> {
    let mut url = template.to_string();
    let mut consumed = Map::new();

    for token in placeholder_names(template) {
        let value = match params.residual.remove(&token) {
            Some(value) => Some(value),
            None => params
                .body
                .as_ref()
                .and_then(Value::as_object)
                .and_then(|body| body.get(&token))
                .cloned(),
        };

        let Some(value) = value else {
            continue;
        };

        let rendered = stringify(&value);
        let encoded = utf8_percent_encode(&rendered, NON_ALPHANUMERIC).to_string();
        url = url.replace(&format!("{{{token}}}"), &encoded);
        consumed.insert(token, value);
    }

    if let Some(unresolved) = path_placeholder_names(&url).first() {
        return Err(GatewayError::bad_input(format!(
            "missing value for path parameter '{unresolved}'"
        )));
    }

    Ok((url, consumed))
}

/// Constructs the request body per the template rules.
///
/// `GET` requests carry no body. An explicit caller body is serialized
/// verbatim; otherwise a JSON template is walked with placeholder
/// substitution, and a non-JSON template gets literal substitution.
fn build_body(method: Method, template: &str, params: &InvocationParams, consumed: &Map<String, Value>) -> Option<String> {
    if !method.allows_body() {
        return None;
    }

    if let Some(body) = &params.body {
        return Some(body.to_string());
    }

    if template.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(template) {
        Ok(parsed) => {
            let substituted = substitute_json(parsed, params, consumed);
            Some(substituted.to_string())
        }
        Err(_) => Some(substitute_literal(template, params, consumed)),
    }
}

/// Recursively replaces `{k}` tokens inside string values of a JSON tree.
fn substitute_json(value: Value, params: &InvocationParams, consumed: &Map<String, Value>) -> Value {
    match value {
        Value::String(text) => Value::String(substitute_literal(&text, params, consumed)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute_json(item, params, consumed))
                .collect(),
        ),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, nested)| (key, substitute_json(nested, params, consumed)))
                .collect(),
        ),
        other => other,
    }
}

fn substitute_literal(template: &str, params: &InvocationParams, consumed: &Map<String, Value>) -> String {
    let mut result = template.to_string();
    for (key, value) in params.residual.iter().chain(consumed.iter()) {
        let token = format!("{{{key}}}");
        if result.contains(&token) {
            result = result.replace(&token, &stringify(value));
        }
    }
    result
}

/// Template headers first, caller headers overlaid on top (caller wins,
/// case-insensitively), and a JSON content type when a body is present
/// without one.
fn assemble_headers(
    template_headers: &IndexMap<String, String>,
    caller_headers: &IndexMap<String, String>,
    has_body: bool,
) -> IndexMap<String, String> {
    let mut headers = template_headers.clone();

    for (name, value) in caller_headers {
        if let Some(existing) = headers.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned() {
            headers.shift_remove(&existing);
        }
        headers.insert(name.clone(), value.clone());
    }

    let has_content_type = headers.keys().any(|key| key.eq_ignore_ascii_case("content-type"));
    if has_body && !has_content_type {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }

    headers
}

/// Appends unconsumed residual parameters as URL-encoded query parameters.
fn append_query(url: String, residual: &Map<String, Value>) -> String {
    if residual.is_empty() {
        return url;
    }

    let mut pairs = Vec::with_capacity(residual.len());
    for (key, value) in residual {
        let encoded_key = utf8_percent_encode(key, NON_ALPHANUMERIC).to_string();
        let encoded_value = utf8_percent_encode(&stringify(value), NON_ALPHANUMERIC).to_string();
        pairs.push(format!("{encoded_key}={encoded_value}"));
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::demux;
    use proptest::prelude::*;
    use serde_json::json;
    use toolgate_types::{RequestTemplate, ResponseTemplate};

    fn tool_with(method: Method, url: &str, body_template: &str) -> Tool {
        Tool {
            name: "t".into(),
            description: String::new(),
            request_template: RequestTemplate {
                method,
                url: url.into(),
                headers: IndexMap::new(),
                body: body_template.into(),
            },
            response_template: ResponseTemplate::default(),
        }
    }

    #[test]
    fn residual_values_fill_path_placeholders_and_leave_the_query() {
        let tool = tool_with(Method::Get, "https://api.example.com/users/{id}", "");
        let plan = build_plan(&tool, demux(json!({"id": "42", "page": 2}))).expect("plan");

        assert_eq!(plan.url, "https://api.example.com/users/42?page=2");
    }

    #[test]
    fn body_values_fill_path_placeholders_without_becoming_query_params() {
        let tool = tool_with(Method::Get, "https://api.example.com/users/{id}", "");
        let plan = build_plan(&tool, demux(json!({"body": {"id": "42"}}))).expect("plan");

        assert_eq!(plan.url, "https://api.example.com/users/42");
    }

    #[test]
    fn unresolved_path_placeholder_is_a_bad_input() {
        let tool = tool_with(Method::Get, "https://api.example.com/users/{id}", "");
        let error = build_plan(&tool, demux(json!({}))).expect_err("unresolved placeholder");
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn unresolved_query_placeholder_stays_literal() {
        let tool = tool_with(Method::Get, "https://api.example.com/search?cursor={cursor}", "");
        let plan = build_plan(&tool, demux(json!({}))).expect("plan");
        assert_eq!(plan.url, "https://api.example.com/search?cursor={cursor}");
    }

    #[test]
    fn path_values_are_percent_encoded() {
        let tool = tool_with(Method::Get, "https://api.example.com/files/{name}", "");
        let plan = build_plan(&tool, demux(json!({"name": "a b"}))).expect("plan");
        assert_eq!(plan.url, "https://api.example.com/files/a%20b");
    }

    #[test]
    fn get_requests_never_carry_a_body() {
        let tool = tool_with(Method::Get, "https://example.com", r#"{"a":1}"#);
        let plan = build_plan(&tool, demux(json!({"body": {"x": 1}}))).expect("plan");
        assert!(plan.body.is_none());
    }

    #[test]
    fn explicit_body_wins_over_the_template() {
        let tool = tool_with(Method::Post, "https://example.com", r#"{"name":"{name}"}"#);
        let plan = build_plan(&tool, demux(json!({"body": {"name": "Ada"}}))).expect("plan");

        let body: Value = serde_json::from_str(plan.body.as_deref().expect("body")).expect("json");
        assert_eq!(body, json!({"name": "Ada"}));
    }

    #[test]
    fn json_template_substitutes_string_placeholders() {
        let tool = tool_with(
            Method::Post,
            "https://example.com",
            r#"{"user":{"name":"{name}"},"count":"{count}","fixed":7}"#,
        );
        let plan = build_plan(&tool, demux(json!({"name": "Ada", "count": 3}))).expect("plan");

        let body: Value = serde_json::from_str(plan.body.as_deref().expect("body")).expect("json");
        assert_eq!(body, json!({"user": {"name": "Ada"}, "count": "3", "fixed": 7}));
    }

    #[test]
    fn path_consumed_values_remain_visible_to_body_templates() {
        let tool = tool_with(Method::Post, "https://example.com/users/{id}", r#"{"id":"{id}"}"#);
        let plan = build_plan(&tool, demux(json!({"id": "42"}))).expect("plan");

        assert_eq!(plan.url, "https://example.com/users/42");
        let body: Value = serde_json::from_str(plan.body.as_deref().expect("body")).expect("json");
        assert_eq!(body, json!({"id": "42"}));
    }

    #[test]
    fn free_form_template_gets_literal_substitution() {
        let tool = tool_with(Method::Post, "https://example.com", "hello {name}");
        let plan = build_plan(&tool, demux(json!({"name": "Ada"}))).expect("plan");
        assert_eq!(plan.body.as_deref(), Some("hello Ada"));
    }

    #[test]
    fn caller_headers_overlay_template_headers_case_insensitively() {
        let mut template_headers = IndexMap::new();
        template_headers.insert("Content-Type".to_string(), "text/plain".to_string());
        template_headers.insert("X-Source".to_string(), "template".to_string());
        let mut tool = tool_with(Method::Post, "https://example.com", "");
        tool.request_template.headers = template_headers;

        let plan = build_plan(
            &tool,
            demux(json!({"headers": {"content-type": "application/xml"}, "body": {}})),
        )
        .expect("plan");

        assert_eq!(plan.headers.len(), 2);
        assert_eq!(plan.headers.get("content-type").map(String::as_str), Some("application/xml"));
        assert_eq!(plan.headers.get("X-Source").map(String::as_str), Some("template"));
    }

    #[test]
    fn json_content_type_is_defaulted_when_a_body_exists() {
        let tool = tool_with(Method::Post, "https://example.com", "");
        let plan = build_plan(&tool, demux(json!({"body": {"a": 1}}))).expect("plan");
        assert_eq!(plan.headers.get("Content-Type").map(String::as_str), Some("application/json"));

        let tool = tool_with(Method::Get, "https://example.com", "");
        let plan = build_plan(&tool, demux(json!({}))).expect("plan");
        assert!(plan.headers.is_empty());
    }

    #[test]
    fn query_values_are_url_encoded() {
        let tool = tool_with(Method::Get, "https://example.com/search", "");
        let plan = build_plan(&tool, demux(json!({"q": "a b&c"}))).expect("plan");
        assert_eq!(plan.url, "https://example.com/search?q=a%20b%26c");
    }

    #[test]
    fn query_appends_to_an_existing_query_string() {
        let tool = tool_with(Method::Get, "https://example.com/search?sort=asc", "");
        let plan = build_plan(&tool, demux(json!({"page": 3}))).expect("plan");
        assert_eq!(plan.url, "https://example.com/search?sort=asc&page=3");
    }

    proptest! {
        /// Demux is a partition: every key of the document lands in exactly
        /// one of headers, body, or the constructed URL/query, never twice.
        #[test]
        fn structural_keys_never_reach_the_query_string(
            header_value in "[a-z]{1,8}",
            body_key in "[a-z]{1,8}",
            extra_key in "x[a-z]{1,8}",
        ) {
            let tool = tool_with(Method::Post, "https://example.com", "");
            let document = json!({
                "headers": {"x-test": header_value},
                "body": {(body_key.clone()): "v"},
                (extra_key.clone()): "residual",
            });

            let plan = build_plan(&tool, demux(document)).expect("plan");
            prop_assert!(!plan.url.contains("headers="));
            prop_assert!(!plan.url.contains("body="));
            let expected_residual = format!("{}=residual", extra_key);
            prop_assert!(plan.url.contains(&expected_residual));
        }
    }
}
