//! MCP server bundles and the tools they own.

use crate::endpoint::{HttpEndpoint, Method};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an MCP server.
///
/// Only `Active` servers answer discovery and invocation traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl ServerStatus {
    /// Lowercase wire form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Draft => "draft",
            ServerStatus::Active => "active",
            ServerStatus::Inactive => "inactive",
        }
    }

    /// Parses the lowercase wire form.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "draft" => Some(ServerStatus::Draft),
            "active" => Some(ServerStatus::Active),
            "inactive" => Some(ServerStatus::Inactive),
            _ => None,
        }
    }
}

/// The stored recipe for constructing one outbound HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub method: Method,
    /// Outbound URL, possibly carrying `{placeholder}` tokens.
    pub url: String,
    /// Default headers, applied before caller-supplied headers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// Body template: JSON-with-placeholders or a free-form string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// Reshapes the upstream response before it is returned to the agent.
///
/// An empty body means the raw upstream payload passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    #[serde(default)]
    pub body: String,
}

/// A named callable unit inside an MCP server: a thin envelope over one
/// upstream HTTP operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub request_template: RequestTemplate,
    #[serde(default)]
    pub response_template: ResponseTemplate,
}

impl Tool {
    /// Whether `name` is usable as a tool name (`[A-Za-z0-9_-]+`).
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '_' || character == '-')
    }
}

/// A named bundle of tools with an activation lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub allow_tools: Vec<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub status: ServerStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl McpServer {
    /// Composes a draft server from a set of resolved endpoints.
    ///
    /// One tool is synthesized per endpoint: the tool inherits the endpoint's
    /// name and description, the request template takes the endpoint's method
    /// and path, and a JSON request-body example becomes the body template.
    /// `allow_tools` defaults to every synthesized tool name. The tools are
    /// copies; later edits to the source endpoints do not alter the server.
    pub fn from_endpoints(name: impl Into<String>, description: impl Into<String>, endpoints: &[HttpEndpoint]) -> Self {
        let now = Utc::now();
        let mut tools = Vec::with_capacity(endpoints.len());
        let mut allow_tools = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            let body_template = endpoint
                .request_body
                .as_ref()
                .and_then(|body| body.example_json().map(|_| body.example.clone()))
                .unwrap_or_default();

            let tool = Tool {
                name: endpoint.name.clone(),
                description: endpoint.description.clone(),
                request_template: RequestTemplate {
                    method: endpoint.method,
                    url: endpoint.path.clone(),
                    headers: IndexMap::new(),
                    body: body_template,
                },
                response_template: ResponseTemplate::default(),
            };

            allow_tools.push(tool.name.clone());
            tools.push(tool);
        }

        Self {
            id: String::new(),
            name: name.into(),
            description: description.into(),
            allow_tools,
            tools,
            version: 1,
            status: ServerStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// Finds a tool by name.
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Whether the allow-list admits the named tool.
    pub fn allows_tool(&self, name: &str) -> bool {
        self.allow_tools.iter().any(|allowed| allowed == name)
    }
}
