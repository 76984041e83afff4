//! Structured descriptions of upstream HTTP operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods an endpoint may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "PATCH")]
    Patch,
}

impl Method {
    /// Uppercase wire form of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }

    /// Whether invocation constructs a request body for this method.
    ///
    /// `GET` requests never carry a body; every other supported method may.
    pub fn allows_body(&self) -> bool {
        !matches!(self, Method::Get)
    }

    /// Whether discovery derives body properties from the stored template.
    pub fn templates_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::Get
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

/// Where a declared parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Path,
    Header,
}

impl ParamLocation {
    /// Lowercase wire form, as used by OpenAPI `in` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
            ParamLocation::Path => "path",
            ParamLocation::Header => "header",
        }
    }

    /// Parses an OpenAPI `in` value; unknown locations yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "query" => Some(ParamLocation::Query),
            "path" => Some(ParamLocation::Path),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }
}

/// JSON-schema style value type tag for parameters and headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    /// Lowercase wire form, as used by JSON schema `type` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }

    /// Parses a JSON schema type name, falling back to `string`.
    pub fn from_name_or_default(name: &str) -> Self {
        match name {
            "integer" => ValueType::Integer,
            "number" => ValueType::Number,
            "boolean" => ValueType::Boolean,
            "array" => ValueType::Array,
            "object" => ValueType::Object,
            _ => ValueType::String,
        }
    }
}

/// A header the upstream operation expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Value type tag; headers observed from curl ingestion are strings.
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
    /// Observed default value, preserved from ingestion so composed tools can
    /// surface it in discovery schemas.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_value: String,
}

/// A query, path, or header parameter the upstream operation declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
}

/// A request or response body description.
///
/// `schema` and `example` are stored as JSON text rather than parsed trees so
/// that records survive round-trips through backends that keep composite
/// fields as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySpec {
    pub content_type: String,
    pub schema: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub example: String,
}

impl BodySpec {
    /// Parses the stored example as JSON, if it is JSON at all.
    pub fn example_json(&self) -> Option<serde_json::Value> {
        if self.example.is_empty() {
            return None;
        }
        serde_json::from_str(&self.example).ok()
    }
}

/// An expected upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    pub status_code: u16,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySpec>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// A registered description of one upstream HTTP operation.
///
/// The `path` is either a fully-qualified URL or a URL template carrying
/// `{param}` placeholders and an optional literal query string. Every
/// mutation through a repository bumps `version` by one and snapshots the
/// prior state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEndpoint {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub method: Method,
    pub path: String,
    #[serde(default)]
    pub headers: Vec<HeaderSpec>,
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<BodySpec>,
    #[serde(default)]
    pub responses: Vec<ResponseSpec>,
    #[serde(default)]
    pub version: u32,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl HttpEndpoint {
    /// Finds the declared header with the given name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&HeaderSpec> {
        self.headers.iter().find(|header| header.name.eq_ignore_ascii_case(name))
    }
}
