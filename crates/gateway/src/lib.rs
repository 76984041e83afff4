//! The inbound HTTP surface of the gateway.
//!
//! Routes endpoint ingestion and lifecycle, server composition and
//! activation, and the MCP discovery/invocation surface onto the catalog,
//! store, transcode, and engine crates.

pub mod error;
pub mod routes;
pub mod seed;
pub mod state;

pub use routes::app;
pub use state::AppState;
