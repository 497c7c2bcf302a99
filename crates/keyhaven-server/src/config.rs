//! Server configuration for `KeyHaven`.
//!
//! Loads configuration from environment variables. Most settings have
//! sensible defaults; the master key and session secret are required and
//! validated at startup so a misconfigured deployment fails loudly instead
//! of silently encrypting with a weak key.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};

use keyhaven_core::crypto::EncryptionKey;

/// Server configuration.
#[derive(Debug)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Master key for vault entry encryption. Must be exactly 32 bytes.
    pub master_key: EncryptionKey,
    /// Secret used to sign session tokens.
    pub jwt_secret: String,
    /// Base URL of the breach range API.
    pub breach_base_url: String,
    /// Timeout for breach API requests.
    pub breach_timeout: Duration,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// PostgreSQL persistent storage.
    Postgres { url: String },
}

impl StorageBackendType {
    /// Backend name for logging. Never includes the connection URL.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (Railway convention, binds to `0.0.0.0`)
    /// - `KEYHAVEN_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `KEYHAVEN_STORAGE` — `memory` or `postgres` (default: `memory`)
    /// - `DATABASE_URL` — PostgreSQL connection string (required when `KEYHAVEN_STORAGE=postgres`)
    /// - `KEYHAVEN_MASTER_KEY` — 32-byte entry encryption key (required)
    /// - `KEYHAVEN_JWT_SECRET` — session token signing secret (required)
    /// - `KEYHAVEN_BREACH_URL` — breach range API base URL (default: HIBP)
    /// - `KEYHAVEN_BREACH_TIMEOUT_SECS` — breach API timeout (default: `10`)
    /// - `KEYHAVEN_LOG_LEVEL` — log filter (default: `info`)
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing, the master key
    /// is not exactly 32 bytes, or the bind address does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = if let Ok(addr) = std::env::var("KEYHAVEN_BIND_ADDR") {
            addr.parse()
                .with_context(|| format!("invalid KEYHAVEN_BIND_ADDR: {addr}"))?
        } else if let Ok(port_str) = std::env::var("PORT") {
            let port: u16 = port_str
                .parse()
                .with_context(|| format!("invalid PORT: {port_str}"))?;
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 8300))
        };

        let storage_backend = match std::env::var("KEYHAVEN_STORAGE")
            .unwrap_or_else(|_| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => {
                let url = std::env::var("DATABASE_URL")
                    .context("DATABASE_URL is required when KEYHAVEN_STORAGE=postgres")?;
                StorageBackendType::Postgres { url }
            }
            "memory" => StorageBackendType::Memory,
            other => bail!("unknown KEYHAVEN_STORAGE backend: {other}"),
        };

        let raw_key = std::env::var("KEYHAVEN_MASTER_KEY")
            .context("KEYHAVEN_MASTER_KEY is required")?;
        let master_key = EncryptionKey::from_slice(raw_key.as_bytes())
            .context("KEYHAVEN_MASTER_KEY must be exactly 32 bytes")?;

        let jwt_secret =
            std::env::var("KEYHAVEN_JWT_SECRET").context("KEYHAVEN_JWT_SECRET is required")?;
        if jwt_secret.is_empty() {
            bail!("KEYHAVEN_JWT_SECRET must not be empty");
        }

        let breach_base_url = std::env::var("KEYHAVEN_BREACH_URL")
            .unwrap_or_else(|_| keyhaven_core::breach::DEFAULT_BASE_URL.to_owned());

        let breach_timeout = std::env::var("KEYHAVEN_BREACH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(keyhaven_core::breach::DEFAULT_TIMEOUT, Duration::from_secs);

        let log_level =
            std::env::var("KEYHAVEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        Ok(Self {
            bind_addr,
            storage_backend,
            master_key,
            jwt_secret,
            breach_base_url,
            breach_timeout,
            log_level,
        })
    }
}
