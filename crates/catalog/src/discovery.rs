//! MCP discovery descriptor synthesis.
//!
//! For each tool of an active server, discovery serves a JSON object with a
//! `parameters` schema that separates `headers` from `body`, plus one worked
//! example. Body properties are derived from the tool's URL template and its
//! stored body template.

use serde_json::{json, Map, Value};
use toolgate_types::template::{path_placeholder_names, split_query};
use toolgate_types::{McpServer, Tool};

/// Descriptors for every tool of a server.
pub fn tools_listing(server: &McpServer) -> Value {
    Value::Array(server.tools.iter().map(tool_descriptor).collect())
}

/// The MCP descriptor for one tool.
pub fn tool_descriptor(tool: &Tool) -> Value {
    let url = &tool.request_template.url;

    let mut body_properties = Map::new();
    let mut required_body_params: Vec<String> = Vec::new();

    for parameter in path_placeholder_names(url) {
        body_properties.insert(
            parameter.clone(),
            json!({
                "type": "string",
                "description": format!("Path parameter '{parameter}'"),
            }),
        );
        required_body_params.push(parameter);
    }

    for (parameter, default) in extract_query_params(url) {
        // Query parameters are typically optional; they get a default but do
        // not join the required list.
        body_properties.insert(
            parameter.clone(),
            json!({
                "type": "string",
                "description": format!("Query parameter '{parameter}'"),
                "default": default,
            }),
        );
    }

    if tool.request_template.method.templates_body() {
        for (parameter, info) in infer_body_properties(&tool.request_template.body) {
            required_body_params.push(parameter.clone());
            body_properties.insert(parameter, info);
        }
    }

    let mut header_properties = well_known_header_properties();
    for (name, value) in &tool.request_template.headers {
        header_properties.insert(
            name.clone(),
            json!({
                "type": "string",
                "description": format!("Header '{name}'"),
                "default": value,
            }),
        );
    }

    let examples = build_examples(tool, &body_properties, &required_body_params, &header_properties);

    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": {
            "type": "object",
            "properties": {
                "headers": {
                    "type": "object",
                    "description": "HTTP headers to include in the request",
                    "properties": Value::Object(header_properties),
                },
                "body": {
                    "type": "object",
                    "description": "Request body data",
                    "properties": Value::Object(body_properties),
                    "required": required_body_params,
                },
            },
            "required": ["body"],
        },
        "examples": examples,
    })
}

fn well_known_header_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "authorization".into(),
        json!({ "type": "string", "description": "Bearer token for authentication" }),
    );
    properties.insert(
        "content-type".into(),
        json!({ "type": "string", "description": "Content type header", "default": "application/json;charset=UTF-8" }),
    );
    properties.insert(
        "accept".into(),
        json!({ "type": "string", "description": "Accept header", "default": "application/json, text/plain, */*" }),
    );
    properties
}

/// Literal query parameters of a URL template.
///
/// The scan splits on `?`, `&`, and `=` without URL-decoding anything; an
/// encoded default like `a%20b` is surfaced as-is. Known gap inherited from
/// the source system.
pub fn extract_query_params(url: &str) -> Vec<(String, String)> {
    let Some(query) = split_query(url).1 else {
        return Vec::new();
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Infers body properties from a JSON body template.
///
/// Each top-level key becomes a property whose type is taken from the
/// example value's JSON type; the example value itself is preserved. A
/// non-JSON template contributes nothing.
pub fn infer_body_properties(body_template: &str) -> Vec<(String, Value)> {
    if body_template.is_empty() {
        return Vec::new();
    }
    let Ok(Value::Object(template)) = serde_json::from_str::<Value>(body_template) else {
        return Vec::new();
    };

    template
        .into_iter()
        .map(|(key, value)| {
            let (type_name, label) = match &value {
                Value::String(_) => ("string", "String"),
                Value::Number(_) => ("number", "Numeric"),
                Value::Bool(_) => ("boolean", "Boolean"),
                Value::Array(_) => ("array", "Array"),
                Value::Object(_) => ("object", "Object"),
                Value::Null => ("string", "String"),
            };
            let info = json!({
                "type": type_name,
                "description": format!("{label} parameter '{key}'"),
                "example": value,
            });
            (key, info)
        })
        .collect()
}

fn build_examples(
    tool: &Tool,
    body_properties: &Map<String, Value>,
    required_body_params: &[String],
    header_properties: &Map<String, Value>,
) -> Value {
    let mut example_body = Map::new();
    for parameter in required_body_params {
        let Some(info) = body_properties.get(parameter).and_then(Value::as_object) else {
            continue;
        };
        example_body.insert(parameter.clone(), example_value(parameter, info));
    }

    // A creation-style tool with nothing inferable still gets representative
    // body data so agents see the envelope shape.
    if example_body.is_empty() && tool.request_template.method.templates_body() {
        example_body.insert("key1".into(), json!("value1"));
        example_body.insert("key2".into(), json!(42));
        example_body.insert("key3".into(), json!(true));
    }

    let mut example_headers = Map::new();
    example_headers.insert("authorization".into(), json!("Bearer <your-token>"));
    example_headers.insert("content-type".into(), json!("application/json;charset=UTF-8"));
    example_headers.insert("accept".into(), json!("application/json, text/plain, */*"));
    for (name, info) in header_properties {
        if example_headers.contains_key(name) {
            continue;
        }
        let default = info.get("default").cloned().unwrap_or_else(|| json!("example-value"));
        example_headers.insert(name.clone(), default);
    }

    json!([
        {
            "name": "Basic Example",
            "parameters": {
                "headers": Value::Object(example_headers),
                "body": Value::Object(example_body),
            },
        }
    ])
}

fn example_value(parameter: &str, info: &Map<String, Value>) -> Value {
    if let Some(example) = info.get("example") {
        if !example.is_null() {
            return example.clone();
        }
    }

    match info.get("type").and_then(Value::as_str).unwrap_or("string") {
        "number" => json!(42),
        "boolean" => json!(true),
        "object" => json!({ "key1": "value1" }),
        "array" => json!(["example_item"]),
        _ => {
            if parameter.contains("id") {
                json!("example-id-123")
            } else if parameter.contains("name") {
                json!("example_name")
            } else {
                json!("example_value")
            }
        }
    }
}
