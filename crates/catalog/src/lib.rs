//! Server catalog: composition, the in-memory registry, and MCP discovery.
//!
//! Composition turns a set of stored endpoints into a draft [`McpServer`];
//! the registry caches active servers for low-latency lookup on the
//! invocation hot path; discovery synthesizes the per-tool JSON-Schema
//! descriptors served under a server's public name.
//!
//! [`McpServer`]: toolgate_types::McpServer

pub mod compose;
pub mod discovery;
pub mod registry;

pub use compose::{compose_server, validate_server_name};
pub use registry::ServerRegistry;
