//! The in-memory registry of servers on the invocation hot path.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use toolgate_types::{GatewayError, McpServer};
use tracing::debug;

/// Process-local mapping of server id to server definition.
///
/// Reads take a shared lock; registration takes an exclusive lock. No lock
/// is ever held across an upstream call. Activation inserts here after the
/// persistence write; lookups of active servers missing from the registry
/// are healed by the callers re-registering from storage on demand.
pub struct ServerRegistry {
    servers: RwLock<HashMap<String, Arc<McpServer>>>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self {
            servers: RwLock::new(HashMap::new()),
        }
    }

    /// Upserts a server definition.
    ///
    /// Registration is idempotent: when the held entry is already at the
    /// incoming version (every mutation bumps it), the call returns without
    /// allocating or replacing anything.
    pub fn register(&self, server: &McpServer) -> Result<(), GatewayError> {
        {
            let servers = self.servers.read().map_err(|_| lock_poisoned())?;
            if let Some(existing) = servers.get(&server.id) {
                if existing.version >= server.version {
                    return Ok(());
                }
            }
        }

        let mut servers = self.servers.write().map_err(|_| lock_poisoned())?;
        debug!(server_id = %server.id, server_name = %server.name, version = server.version, "registering server");
        servers.insert(server.id.clone(), Arc::new(server.clone()));
        Ok(())
    }

    /// Fetches a server by id.
    pub fn lookup_by_id(&self, id: &str) -> Result<Option<Arc<McpServer>>, GatewayError> {
        let servers = self.servers.read().map_err(|_| lock_poisoned())?;
        Ok(servers.get(id).cloned())
    }

    /// Fetches a server by its public name.
    pub fn lookup_by_name(&self, name: &str) -> Result<Option<Arc<McpServer>>, GatewayError> {
        let servers = self.servers.read().map_err(|_| lock_poisoned())?;
        Ok(servers.values().find(|server| server.name == name).cloned())
    }

    /// Drops a server from the registry (deletion path; deactivation leaves
    /// the entry in place and relies on the status gate).
    pub fn remove(&self, id: &str) -> Result<(), GatewayError> {
        let mut servers = self.servers.write().map_err(|_| lock_poisoned())?;
        servers.remove(id);
        Ok(())
    }

    /// Number of registered servers.
    pub fn len(&self) -> usize {
        self.servers.read().map(|servers| servers.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_poisoned() -> GatewayError {
    GatewayError::internal("server registry lock poisoned")
}
