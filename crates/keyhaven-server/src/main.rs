//! `KeyHaven` server entry point.
//!
//! Loads configuration, validates the master key, bootstraps the storage
//! backend, then starts the Axum HTTP server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use keyhaven_core::breach::BreachClient;
use keyhaven_core::crypto::StaticKeyProvider;
use keyhaven_core::session::SessionSigner;
use keyhaven_storage::{MemoryStore, PostgresStore, VaultStore};

use keyhaven_server::config::{ServerConfig, StorageBackendType};
use keyhaven_server::routes;
use keyhaven_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Fail fast on a missing or short master key, before anything binds.
    let config = ServerConfig::from_env()?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = config.storage_backend.kind(), "KeyHaven starting");

    let store: Arc<dyn VaultStore> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (data will not persist)");
            Arc::new(MemoryStore::new())
        }
        StorageBackendType::Postgres { url } => {
            info!("using PostgreSQL storage");
            Arc::new(
                PostgresStore::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL storage")?,
            )
        }
    };

    let breach = BreachClient::new(config.breach_base_url.clone(), config.breach_timeout)
        .context("failed to build breach API client")?;

    let state = Arc::new(AppState {
        store,
        keys: StaticKeyProvider::new(config.master_key.clone()),
        signer: SessionSigner::new(&config.jwt_secret),
        breach,
    });

    let app = routes::app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "KeyHaven server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("KeyHaven server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
