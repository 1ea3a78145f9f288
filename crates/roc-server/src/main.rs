//! Gateway entry point.
//!
//! Loads configuration from the environment, wires the backend client,
//! authorizer and spec documents, then serves until `Ctrl-C`.

use std::sync::Arc;

use roc_server::auth::{AllowAll, Authorizer, BearerRoles};
use roc_server::{AppState, GatewayConfig, SpecRegistry, start_server};
use roc_southbound::{MemoryBackend, MemorySnapshot, Southbound};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, spec loading or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("roc-gateway starting");

    let config = GatewayConfig::from_env()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        backend_timeout_ms = config.backend_timeout.as_millis(),
        authorization = config.authorization,
        max_transactions = config.max_transactions,
        "configuration loaded"
    );

    let backend = match &config.backend_snapshot {
        Some(path) => {
            let snapshot = MemorySnapshot::from_file(path)?;
            info!(path = %path.display(), "backend snapshot loaded");
            MemoryBackend::from_snapshot(snapshot)
        }
        None => {
            warn!("no backend snapshot configured, serving an empty backend");
            MemoryBackend::new()
        }
    };
    let southbound = Southbound::new(Arc::new(backend), config.backend_timeout)
        .with_max_records(config.max_transactions);

    let authorizer: Arc<dyn Authorizer> = if config.authorization {
        let table = config.bearer_roles.as_deref().unwrap_or_default();
        if table.is_empty() {
            warn!("authorization enabled with no bearer tokens, every protected call will fail");
        }
        Arc::new(BearerRoles::parse(table))
    } else {
        Arc::new(AllowAll)
    };

    let specs = SpecRegistry::load(config.spec_dir.as_deref())?;
    info!(
        surfaces = specs.surface_names().count(),
        "spec documents loaded"
    );

    let state = Arc::new(AppState::from_config(
        &config,
        southbound,
        specs,
        authorizer,
    ));
    start_server(&config.server, state).await?;

    Ok(())
}
