//! In-memory repositories with full version history.
//!
//! These are the normative implementations: every mutation appends an
//! immutable snapshot, so versions form a dense `1..=current` sequence per
//! record.

use crate::{EndpointRepository, ServerRepository, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use toolgate_types::{HttpEndpoint, McpServer, ServerStatus};
use uuid::Uuid;

/// Current records plus per-record snapshot history.
struct VersionedTable<T> {
    records: HashMap<String, T>,
    history: HashMap<String, BTreeMap<u32, T>>,
}

impl<T: Clone> VersionedTable<T> {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            history: HashMap::new(),
        }
    }

    fn snapshot(&mut self, id: &str, version: u32, record: T) {
        self.history.entry(id.to_string()).or_default().insert(version, record);
    }

    fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError> {
        let history = self.history.get(id).ok_or(StoreError::NotFound)?;
        Ok(history.keys().copied().collect())
    }

    fn get_version(&self, id: &str, version: u32) -> Result<T, StoreError> {
        self.history
            .get(id)
            .and_then(|history| history.get(&version))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        if self.records.remove(id).is_none() {
            return Err(StoreError::NotFound);
        }
        self.history.remove(id);
        Ok(())
    }
}

/// In-memory [`EndpointRepository`].
pub struct MemoryEndpointRepository {
    table: RwLock<VersionedTable<HttpEndpoint>>,
}

impl MemoryEndpointRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(VersionedTable::new()),
        }
    }
}

impl Default for MemoryEndpointRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EndpointRepository for MemoryEndpointRepository {
    async fn create(&self, endpoint: &mut HttpEndpoint) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;

        let now = Utc::now();
        endpoint.id = Uuid::new_v4().to_string();
        endpoint.version = 1;
        endpoint.created_at = now;
        endpoint.updated_at = now;

        table.records.insert(endpoint.id.clone(), endpoint.clone());
        table.snapshot(&endpoint.id, 1, endpoint.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<HttpEndpoint, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table.records.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<HttpEndpoint>, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.records.values().cloned().collect())
    }

    async fn update(&self, endpoint: &mut HttpEndpoint) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;

        let existing = table.records.get(&endpoint.id).ok_or(StoreError::NotFound)?;
        endpoint.version = existing.version + 1;
        endpoint.created_at = existing.created_at;
        endpoint.updated_at = Utc::now();

        table.records.insert(endpoint.id.clone(), endpoint.clone());
        table.snapshot(&endpoint.id, endpoint.version, endpoint.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;
        table.remove(id)
    }

    async fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table.versions(id)
    }

    async fn get_by_version(&self, id: &str, version: u32) -> Result<HttpEndpoint, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table.get_version(id, version)
    }
}

/// In-memory [`ServerRepository`].
pub struct MemoryServerRepository {
    table: RwLock<VersionedTable<McpServer>>,
}

impl MemoryServerRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(VersionedTable::new()),
        }
    }
}

impl Default for MemoryServerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServerRepository for MemoryServerRepository {
    async fn create(&self, server: &mut McpServer) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;

        let now = Utc::now();
        server.id = Uuid::new_v4().to_string();
        server.version = 1;
        server.created_at = now;
        server.updated_at = now;

        table.records.insert(server.id.clone(), server.clone());
        table.snapshot(&server.id, 1, server.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<McpServer, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table.records.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_by_name(&self, name: &str) -> Result<McpServer, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table
            .records
            .values()
            .find(|server| server.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_all(&self) -> Result<Vec<McpServer>, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(table.records.values().cloned().collect())
    }

    async fn update(&self, server: &mut McpServer) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;

        let existing = table.records.get(&server.id).ok_or(StoreError::NotFound)?;
        server.version = existing.version + 1;
        server.created_at = existing.created_at;
        server.updated_at = Utc::now();

        table.records.insert(server.id.clone(), server.clone());
        table.snapshot(&server.id, server.version, server.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;
        table.remove(id)
    }

    async fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table.versions(id)
    }

    async fn get_by_version(&self, id: &str, version: u32) -> Result<McpServer, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::LockPoisoned)?;
        table.get_version(id, version)
    }

    async fn update_status(&self, id: &str, status: ServerStatus) -> Result<McpServer, StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::LockPoisoned)?;

        let mut updated = table.records.get(id).cloned().ok_or(StoreError::NotFound)?;
        updated.status = status;
        updated.version += 1;
        updated.updated_at = Utc::now();

        table.records.insert(updated.id.clone(), updated.clone());
        table.snapshot(&updated.id, updated.version, updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_types::Method;

    fn sample_endpoint(name: &str) -> HttpEndpoint {
        HttpEndpoint {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            method: Method::Get,
            path: "https://api.example.com".into(),
            headers: vec![],
            parameters: vec![],
            request_body: None,
            responses: vec![],
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_version_one() {
        let repository = MemoryEndpointRepository::new();
        let mut endpoint = sample_endpoint("a");
        repository.create(&mut endpoint).await.expect("create");

        assert!(!endpoint.id.is_empty());
        assert_eq!(endpoint.version, 1);
        let fetched = repository.get_by_id(&endpoint.id).await.expect("get");
        assert_eq!(fetched.name, "a");
    }

    #[tokio::test]
    async fn update_bumps_version_and_keeps_history_dense() {
        let repository = MemoryEndpointRepository::new();
        let mut endpoint = sample_endpoint("a");
        repository.create(&mut endpoint).await.expect("create");
        let created_at = endpoint.created_at;

        endpoint.description = "first edit".into();
        repository.update(&mut endpoint).await.expect("update");
        assert_eq!(endpoint.version, 2);
        assert_eq!(endpoint.created_at, created_at);

        endpoint.description = "second edit".into();
        repository.update(&mut endpoint).await.expect("update");
        assert_eq!(endpoint.version, 3);

        assert_eq!(repository.versions(&endpoint.id).await.expect("versions"), vec![1, 2, 3]);
        let first = repository.get_by_version(&endpoint.id, 1).await.expect("snapshot");
        assert!(first.description.is_empty());
        let second = repository.get_by_version(&endpoint.id, 2).await.expect("snapshot");
        assert_eq!(second.description, "first edit");
    }

    #[tokio::test]
    async fn delete_removes_record_and_history() {
        let repository = MemoryEndpointRepository::new();
        let mut endpoint = sample_endpoint("a");
        repository.create(&mut endpoint).await.expect("create");

        repository.delete(&endpoint.id).await.expect("delete");
        assert!(matches!(repository.get_by_id(&endpoint.id).await, Err(StoreError::NotFound)));
        assert!(matches!(repository.versions(&endpoint.id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn missing_records_surface_not_found() {
        let repository = MemoryEndpointRepository::new();
        assert!(matches!(repository.get_by_id("nope").await, Err(StoreError::NotFound)));
        assert!(matches!(repository.delete("nope").await, Err(StoreError::NotFound)));
        let mut ghost = sample_endpoint("ghost");
        ghost.id = "nope".into();
        assert!(matches!(repository.update(&mut ghost).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn server_lookup_by_name_and_status_mutation() {
        let repository = MemoryServerRepository::new();
        let mut server = McpServer::from_endpoints("gh", "github tools", &[]);
        repository.create(&mut server).await.expect("create");

        let by_name = repository.get_by_name("gh").await.expect("get by name");
        assert_eq!(by_name.id, server.id);
        assert_eq!(by_name.status, ServerStatus::Draft);

        let activated = repository.update_status(&server.id, ServerStatus::Active).await.expect("activate");
        assert_eq!(activated.status, ServerStatus::Active);
        assert_eq!(activated.version, 2);

        // The status flip is a mutation like any other: snapshotted.
        let draft_snapshot = repository.get_by_version(&server.id, 1).await.expect("snapshot");
        assert_eq!(draft_snapshot.status, ServerStatus::Draft);
    }

    #[tokio::test]
    async fn allow_tools_stay_a_subset_after_deactivation() {
        let repository = MemoryServerRepository::new();
        let endpoints = vec![sample_endpoint("tool-a")];
        let mut server = McpServer::from_endpoints("s", "", &endpoints);
        repository.create(&mut server).await.expect("create");
        repository.update_status(&server.id, ServerStatus::Active).await.expect("activate");
        let deactivated = repository.update_status(&server.id, ServerStatus::Inactive).await.expect("deactivate");

        for allowed in &deactivated.allow_tools {
            assert!(deactivated.tool(allowed).is_some());
        }
    }
}
