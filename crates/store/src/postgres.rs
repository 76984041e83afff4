//! Postgres-backed repositories.
//!
//! Composite fields (`headers`, `parameters`, `request_body`, `responses`,
//! `tools`, `allow_tools`) are stored as JSONB next to a monotone integer
//! `version` column. Only the current row is kept per record, so the version
//! list has a single element and only the current version is addressable;
//! the in-memory store carries the full-history semantics.

use crate::{EndpointRepository, ServerRepository, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use toolgate_types::{HttpEndpoint, McpServer, Method, ServerStatus};
use tracing::debug;
use uuid::Uuid;

/// Postgres [`EndpointRepository`] over the `http_interfaces` table.
pub struct PgEndpointRepository {
    pool: PgPool,
}

impl PgEndpointRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing table when it does not exist yet.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS http_interfaces (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                method TEXT NOT NULL,
                path TEXT NOT NULL,
                headers JSONB NOT NULL DEFAULT '[]',
                parameters JSONB NOT NULL DEFAULT '[]',
                request_body JSONB,
                responses JSONB NOT NULL DEFAULT '[]',
                version INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        debug!("http_interfaces table ready");
        Ok(())
    }
}

fn row_to_endpoint(row: &PgRow) -> Result<HttpEndpoint, StoreError> {
    let method: String = row.try_get("method")?;
    let method: Method = method.parse().map_err(StoreError::backend)?;

    let version: i32 = row.try_get("version")?;

    Ok(HttpEndpoint {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        method,
        path: row.try_get("path")?,
        headers: from_json_column(row, "headers")?,
        parameters: from_json_column(row, "parameters")?,
        request_body: row
            .try_get::<Option<serde_json::Value>, _>("request_body")?
            .map(serde_json::from_value)
            .transpose()
            .map_err(|error| StoreError::backend(error.to_string()))?,
        responses: from_json_column(row, "responses")?,
        version: version as u32,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn from_json_column<T: serde::de::DeserializeOwned>(row: &PgRow, column: &str) -> Result<T, StoreError> {
    let value: serde_json::Value = row.try_get(column)?;
    serde_json::from_value(value).map_err(|error| StoreError::backend(format!("column {column}: {error}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|error| StoreError::backend(error.to_string()))
}

#[async_trait]
impl EndpointRepository for PgEndpointRepository {
    async fn create(&self, endpoint: &mut HttpEndpoint) -> Result<(), StoreError> {
        let now = Utc::now();
        endpoint.id = Uuid::new_v4().to_string();
        endpoint.version = 1;
        endpoint.created_at = now;
        endpoint.updated_at = now;

        sqlx::query(
            r#"
            INSERT INTO http_interfaces
                (id, name, description, method, path, headers, parameters, request_body, responses, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&endpoint.id)
        .bind(&endpoint.name)
        .bind(&endpoint.description)
        .bind(endpoint.method.as_str())
        .bind(&endpoint.path)
        .bind(to_json(&endpoint.headers)?)
        .bind(to_json(&endpoint.parameters)?)
        .bind(endpoint.request_body.as_ref().map(to_json).transpose()?)
        .bind(to_json(&endpoint.responses)?)
        .bind(endpoint.version as i32)
        .bind(endpoint.created_at)
        .bind(endpoint.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<HttpEndpoint, StoreError> {
        let row = sqlx::query("SELECT * FROM http_interfaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row_to_endpoint(&row)
    }

    async fn get_all(&self) -> Result<Vec<HttpEndpoint>, StoreError> {
        let rows = sqlx::query("SELECT * FROM http_interfaces ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_endpoint).collect()
    }

    async fn update(&self, endpoint: &mut HttpEndpoint) -> Result<(), StoreError> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            UPDATE http_interfaces
            SET name = $2, description = $3, method = $4, path = $5, headers = $6,
                parameters = $7, request_body = $8, responses = $9,
                version = version + 1, updated_at = $10
            WHERE id = $1
            RETURNING version, created_at
            "#,
        )
        .bind(&endpoint.id)
        .bind(&endpoint.name)
        .bind(&endpoint.description)
        .bind(endpoint.method.as_str())
        .bind(&endpoint.path)
        .bind(to_json(&endpoint.headers)?)
        .bind(to_json(&endpoint.parameters)?)
        .bind(endpoint.request_body.as_ref().map(to_json).transpose()?)
        .bind(to_json(&endpoint.responses)?)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        let version: i32 = row.try_get("version")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        endpoint.version = version as u32;
        endpoint.created_at = created_at;
        endpoint.updated_at = now;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM http_interfaces WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError> {
        let current = self.get_by_id(id).await?;
        Ok(vec![current.version])
    }

    async fn get_by_version(&self, id: &str, version: u32) -> Result<HttpEndpoint, StoreError> {
        let current = self.get_by_id(id).await?;
        if current.version != version {
            return Err(StoreError::NotFound);
        }
        Ok(current)
    }
}

/// Postgres [`ServerRepository`] over the `mcp_servers` table.
pub struct PgServerRepository {
    pool: PgPool,
}

impl PgServerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the backing table when it does not exist yet.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mcp_servers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                tools JSONB NOT NULL DEFAULT '[]',
                allow_tools JSONB NOT NULL DEFAULT '[]',
                status TEXT NOT NULL,
                version INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        debug!("mcp_servers table ready");
        Ok(())
    }
}

fn row_to_server(row: &PgRow) -> Result<McpServer, StoreError> {
    let status: String = row.try_get("status")?;
    let status = ServerStatus::from_name(&status).ok_or_else(|| StoreError::backend(format!("unknown server status '{status}'")))?;

    let version: i32 = row.try_get("version")?;

    Ok(McpServer {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        tools: from_json_column(row, "tools")?,
        allow_tools: from_json_column(row, "allow_tools")?,
        status,
        version: version as u32,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ServerRepository for PgServerRepository {
    async fn create(&self, server: &mut McpServer) -> Result<(), StoreError> {
        let now = Utc::now();
        server.id = Uuid::new_v4().to_string();
        server.version = 1;
        server.created_at = now;
        server.updated_at = now;

        sqlx::query(
            r#"
            INSERT INTO mcp_servers
                (id, name, description, tools, allow_tools, status, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&server.id)
        .bind(&server.name)
        .bind(&server.description)
        .bind(to_json(&server.tools)?)
        .bind(to_json(&server.allow_tools)?)
        .bind(server.status.as_str())
        .bind(server.version as i32)
        .bind(server.created_at)
        .bind(server.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<McpServer, StoreError> {
        let row = sqlx::query("SELECT * FROM mcp_servers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row_to_server(&row)
    }

    async fn get_by_name(&self, name: &str) -> Result<McpServer, StoreError> {
        let row = sqlx::query("SELECT * FROM mcp_servers WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row_to_server(&row)
    }

    async fn get_all(&self) -> Result<Vec<McpServer>, StoreError> {
        let rows = sqlx::query("SELECT * FROM mcp_servers ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_server).collect()
    }

    async fn update(&self, server: &mut McpServer) -> Result<(), StoreError> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            UPDATE mcp_servers
            SET name = $2, description = $3, tools = $4, allow_tools = $5, status = $6,
                version = version + 1, updated_at = $7
            WHERE id = $1
            RETURNING version, created_at
            "#,
        )
        .bind(&server.id)
        .bind(&server.name)
        .bind(&server.description)
        .bind(to_json(&server.tools)?)
        .bind(to_json(&server.allow_tools)?)
        .bind(server.status.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        let version: i32 = row.try_get("version")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        server.version = version as u32;
        server.created_at = created_at;
        server.updated_at = now;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM mcp_servers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn versions(&self, id: &str) -> Result<Vec<u32>, StoreError> {
        let current = self.get_by_id(id).await?;
        Ok(vec![current.version])
    }

    async fn get_by_version(&self, id: &str, version: u32) -> Result<McpServer, StoreError> {
        let current = self.get_by_id(id).await?;
        if current.version != version {
            return Err(StoreError::NotFound);
        }
        Ok(current)
    }

    async fn update_status(&self, id: &str, status: ServerStatus) -> Result<McpServer, StoreError> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            UPDATE mcp_servers
            SET status = $2, version = version + 1, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        row_to_server(&row)
    }
}
