//! Shared domain model for the toolgate gateway.
//!
//! This crate defines the records the rest of the workspace operates on:
//! HTTP endpoint descriptions ingested from operators, the tools synthesized
//! from them, the MCP servers that bundle tools, and the error taxonomy every
//! surface maps onto HTTP statuses.

pub mod endpoint;
pub mod error;
pub mod server;
pub mod template;

pub use endpoint::{BodySpec, HeaderSpec, HttpEndpoint, Method, ParamLocation, ParamSpec, ResponseSpec, ValueType};
pub use error::GatewayError;
pub use server::{McpServer, RequestTemplate, ResponseTemplate, ServerStatus, Tool};
