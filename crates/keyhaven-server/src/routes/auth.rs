//! Account routes: `/v1/auth/*`
//!
//! Registration, login, email verification, and session info. Sessions are
//! stateless signed tokens — logout is a client-side concern, the endpoint
//! exists so clients have a uniform place to end a session.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keyhaven_storage::{NewUser, User};

use crate::error::AppError;
use crate::middleware::AuthedUser;
use crate::password::{hash_password, verify_password};
use crate::state::AppState;

/// Build the unauthenticated auth router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check-user", get(check_user))
        .route("/verify-email", post(verify_email))
}

/// Build the auth routes that require a valid session token.
pub fn session_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(me))
}

// ── Request / response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckUserQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub verified: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            verified: user.verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `POST /v1/auth/register` — create an account and issue a session token.
///
/// New accounts start unverified; login is gated on verification but the
/// freshly issued token is usable immediately.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("username is required".to_owned()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::BadRequest("email is required".to_owned()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_owned()));
    }

    let email = req.email.trim().to_lowercase();
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email already registered".to_owned()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .store
        .create_user(NewUser {
            name: req.username.trim().to_owned(),
            email,
            password_hash,
            role: "user".to_owned(),
            verified: false,
        })
        .await?;

    let token = state
        .signer
        .issue(user.id, &user.email, &user.role)
        .map_err(|e| AppError::Internal(format!("token issue failed: {e}")))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// `POST /v1/auth/login` — verify credentials and issue a session token.
///
/// The same `Unauthorized` response covers an unknown email and a wrong
/// password, so login failures do not reveal which accounts exist.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let Some(user) = state.store.find_user_by_email(&email).await? else {
        return Err(AppError::Unauthorized("invalid credentials".to_owned()));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("invalid credentials".to_owned()));
    }

    if !user.verified {
        return Err(AppError::Forbidden(
            "email address is not verified".to_owned(),
        ));
    }

    let token = state
        .signer
        .issue(user.id, &user.email, &user.role)
        .map_err(|e| AppError::Internal(format!("token issue failed: {e}")))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// `GET /v1/auth/check-user?email=...` — whether an account exists.
async fn check_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckUserQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = query.email.trim().to_lowercase();
    if state.store.find_user_by_email(&email).await?.is_none() {
        return Err(AppError::NotFound("no account with that email".to_owned()));
    }
    Ok(Json(MessageResponse {
        message: "account exists".to_owned(),
    }))
}

/// `POST /v1/auth/verify-email` — mark an account's email as verified.
async fn verify_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    state.store.mark_user_verified(&email).await?;

    tracing::info!(email = %email, "email verified");

    Ok(Json(MessageResponse {
        message: "email verified".to_owned(),
    }))
}

/// `GET /v1/auth/me` — profile of the authenticated user.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<UserInfo>, AppError> {
    let Some(user) = state.store.find_user_by_id(auth.user_id).await? else {
        return Err(AppError::NotFound("user not found".to_owned()));
    };
    Ok(Json(user.into()))
}

/// `POST /v1/auth/logout` — end the session.
///
/// Tokens are stateless, so there is nothing to revoke server-side; the
/// client discards the token.
async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "logged out".to_owned(),
    })
}
