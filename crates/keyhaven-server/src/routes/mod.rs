//! HTTP route assembly.
//!
//! Route groups:
//! - `/v1/auth/*` — registration and login (unauthenticated, concurrency
//!   limited because argon2 hashing is CPU-heavy)
//! - `/v1/auth/me` and `/v1/passwords/*` — require a valid session token
//! - `/v1/sys/health` — liveness probe

pub mod auth;
pub mod passwords;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware as axum_mw;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    // Authenticated routes go through the auth middleware layer.
    let authenticated_routes = Router::new()
        .nest("/v1/passwords", passwords::router())
        .nest("/v1/auth", auth::session_router())
        .route_layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    // Concurrency-limit the public auth routes (register/login hash with
    // argon2) to prevent resource exhaustion.
    let public_auth = Router::new()
        .nest("/v1/auth", auth::router())
        .layer(tower::limit::ConcurrencyLimitLayer::new(16));

    // CORS — the dashboard frontend runs on a different origin in dev.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    Router::new()
        .merge(authenticated_routes)
        .merge(public_auth)
        .route("/v1/sys/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// `GET /v1/sys/health` — liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
