//! Persistence contracts and backends for endpoint and server records.
//!
//! The repository traits are the only thing the rest of the gateway depends
//! on. Two backends implement them: an in-memory store that keeps the full
//! version-snapshot history (the normative semantics) and a Postgres store
//! that keeps only the current row per record.

pub mod config;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use toolgate_types::{GatewayError, HttpEndpoint, McpServer, ServerStatus};

/// Failures surfaced by a repository backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::backend(other.to_string()),
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => GatewayError::not_found("record not found"),
            other => GatewayError::internal(other.to_string()),
        }
    }
}

/// Storage contract for HTTP endpoint records.
///
/// `create` assigns the id, sets `version` to 1, and stamps both timestamps;
/// `update` bumps `version` by exactly one and preserves `created_at`. Both
/// write the mutated record back through the `&mut` argument, and both
/// snapshot the resulting state so prior versions stay addressable.
#[async_trait]
pub trait EndpointRepository: Send + Sync {
    async fn create(&self, endpoint: &mut HttpEndpoint) -> Result<(), StoreError>;
    async fn get_by_id(&self, id: &str) -> Result<HttpEndpoint, StoreError>;
    async fn get_all(&self) -> Result<Vec<HttpEndpoint>, StoreError>;
    async fn update(&self, endpoint: &mut HttpEndpoint) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    async fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError>;
    async fn get_by_version(&self, id: &str, version: u32) -> Result<HttpEndpoint, StoreError>;
}

/// Storage contract for MCP server records.
///
/// Mutation semantics match [`EndpointRepository`]; `update_status` is a
/// mutation too and returns the updated record so callers can refresh the
/// in-memory registry without a second read.
#[async_trait]
pub trait ServerRepository: Send + Sync {
    async fn create(&self, server: &mut McpServer) -> Result<(), StoreError>;
    async fn get_by_id(&self, id: &str) -> Result<McpServer, StoreError>;
    async fn get_by_name(&self, name: &str) -> Result<McpServer, StoreError>;
    async fn get_all(&self) -> Result<Vec<McpServer>, StoreError>;
    async fn update(&self, server: &mut McpServer) -> Result<(), StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    async fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError>;
    async fn get_by_version(&self, id: &str, version: u32) -> Result<McpServer, StoreError>;
    async fn update_status(&self, id: &str, status: ServerStatus) -> Result<McpServer, StoreError>;
}
