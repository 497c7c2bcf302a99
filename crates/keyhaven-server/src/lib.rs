//! `KeyHaven` HTTP server.
//!
//! Wires together the core library, storage backend, and HTTP routes into a
//! running Axum server. Serves the JSON API at `/v1/*`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod state;
