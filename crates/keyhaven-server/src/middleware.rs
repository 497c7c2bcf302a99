//! Bearer-token authentication middleware.
//!
//! Verifies the session token from the `Authorization: Bearer <token>`
//! header and injects an [`AuthedUser`] into request extensions. Handlers
//! behind this layer can rely on the extension being present.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Identity of the authenticated caller, extracted from a verified session
/// token.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

/// Axum middleware that authenticates API requests.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the `Authorization` header is
/// missing, malformed, or carries an invalid or expired token.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let Some(header) = auth_header else {
        return Err(AppError::Unauthorized(
            "missing Authorization header".to_owned(),
        ));
    };

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authorization header must use Bearer scheme".to_owned())
    })?;

    let claims = state.signer.verify(token)?;

    req.extensions_mut().insert(AuthedUser {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
