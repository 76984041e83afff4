//! The toolgate server binary.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use toolgate_engine::dispatch::{HttpDispatcher, DEFAULT_UPSTREAM_TIMEOUT};
use toolgate_engine::InvocationEngine;
use toolgate_gateway::{app, seed, AppState};
use toolgate_store::config::{self, DbConfig};
use toolgate_store::memory::{MemoryEndpointRepository, MemoryServerRepository};
use toolgate_store::postgres::{PgEndpointRepository, PgServerRepository};
use toolgate_store::{EndpointRepository, ServerRepository};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: &str = "8080";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (endpoints, servers) = build_repositories().await?;

    let timeout = upstream_timeout();
    let dispatcher = HttpDispatcher::new(timeout).context("build upstream dispatcher")?;
    let engine = InvocationEngine::new(Arc::new(dispatcher));

    let state = AppState::new(endpoints, servers, engine);
    let shutdown = state.shutdown.clone();
    let router = app(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let bind_address = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("bind {bind_address}"))?;
    info!(%bind_address, "toolgate listening");

    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("serve HTTP")?;

    info!("toolgate stopped");
    Ok(())
}

async fn build_repositories() -> Result<(Arc<dyn EndpointRepository>, Arc<dyn ServerRepository>)> {
    if config::use_postgres() {
        let db_config = DbConfig::from_env();
        let pool = config::connect(&db_config)
            .await
            .with_context(|| format!("connect to {}", db_config.display()))?;

        let endpoint_repository = PgEndpointRepository::new(pool.clone());
        endpoint_repository.initialize().await.context("initialize http_interfaces")?;
        let server_repository = PgServerRepository::new(pool);
        server_repository.initialize().await.context("initialize mcp_servers")?;

        info!(database = %db_config.display(), "using Postgres repositories");
        let endpoints: Arc<dyn EndpointRepository> = Arc::new(endpoint_repository);
        let servers: Arc<dyn ServerRepository> = Arc::new(server_repository);

        // Seed examples only when the catalog is empty.
        if endpoints.get_all().await.map(|existing| existing.is_empty()).unwrap_or(false) {
            seed::seed_examples(&endpoints).await;
        }
        Ok((endpoints, servers))
    } else {
        info!("using in-memory repositories");
        let endpoints: Arc<dyn EndpointRepository> = Arc::new(MemoryEndpointRepository::new());
        let servers: Arc<dyn ServerRepository> = Arc::new(MemoryServerRepository::new());
        seed::seed_examples(&endpoints).await;
        Ok((endpoints, servers))
    }
}

fn upstream_timeout() -> Duration {
    std::env::var("UPSTREAM_TIMEOUT_SECS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT)
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
        shutdown.cancel();
    }
}
