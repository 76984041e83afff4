//! Server composition from stored endpoints.

use toolgate_store::{EndpointRepository, ServerRepository, StoreError};
use toolgate_types::{GatewayError, McpServer, Tool};
use tracing::info;

/// Checks that `name` is nonempty and not taken by another live server.
///
/// Pass the record's own id as `exclude_id` when validating an update so a
/// server may keep its current name.
pub async fn validate_server_name(name: &str, exclude_id: &str, servers: &dyn ServerRepository) -> Result<(), GatewayError> {
    if name.is_empty() {
        return Err(GatewayError::bad_input("name cannot be empty"));
    }

    let existing = servers.get_all().await.map_err(GatewayError::from)?;
    for server in existing {
        if server.name == name && server.id != exclude_id {
            return Err(GatewayError::conflict(format!("MCP server with name '{name}' already exists")));
        }
    }

    Ok(())
}

/// Composes and persists a draft server over the given endpoint ids.
///
/// Resolution rejects on the first missing id; name collisions and invalid
/// tool names fail before anything is persisted, so there are no partial
/// records.
pub async fn compose_server(
    name: &str,
    description: &str,
    endpoint_ids: &[String],
    endpoints: &dyn EndpointRepository,
    servers: &dyn ServerRepository,
) -> Result<McpServer, GatewayError> {
    validate_server_name(name, "", servers).await?;

    let mut resolved = Vec::with_capacity(endpoint_ids.len());
    for endpoint_id in endpoint_ids {
        let endpoint = endpoints.get_by_id(endpoint_id).await.map_err(|error| match error {
            StoreError::NotFound => GatewayError::not_found(format!("HTTP interface not found: {endpoint_id}")),
            other => GatewayError::from(other),
        })?;
        if !Tool::is_valid_name(&endpoint.name) {
            return Err(GatewayError::bad_input(format!(
                "endpoint name '{}' is not a valid tool name",
                endpoint.name
            )));
        }
        resolved.push(endpoint);
    }

    let mut server = McpServer::from_endpoints(name, description, &resolved);
    servers.create(&mut server).await.map_err(GatewayError::from)?;

    info!(server_id = %server.id, server_name = %server.name, tool_count = server.tools.len(), "composed MCP server");
    Ok(server)
}
