//! HTTP error type for the `KeyHaven` API.
//!
//! Maps domain errors from the core and storage crates into HTTP responses
//! with a uniform JSON body of `{ "error": ..., "message": ... }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use keyhaven_core::error::{AuthError, BreachError, CryptoError, GenerateError};
use keyhaven_storage::StorageError;

/// API error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Authentication required, invalid credentials, or session expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (e.g., unverified account).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Client sent invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource already exists (duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The upstream breach API failed or timed out.
    #[error("breach check failed: {0}")]
    BreachCheck(String),

    /// Internal error (database, crypto, etc.).
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            Self::BreachCheck(msg) => {
                tracing::warn!(error = %msg, "breach range API failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "breach_check_failed",
                    "breach check service unavailable".to_owned(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_owned(),
                )
            }
        };

        let body = ErrorBody {
            error: error_type,
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound("resource not found".to_owned()),
            StorageError::Conflict { reason } => Self::Conflict(reason),
            StorageError::Backend { reason } => Self::Internal(format!("storage error: {reason}")),
        }
    }
}

impl From<AuthError> for AppError {
    // The precise failure reason is logged at debug level by the verifier;
    // the client only learns that the token was rejected.
    fn from(_: AuthError) -> Self {
        Self::Unauthorized("invalid or expired session token".to_owned())
    }
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        Self::Internal(format!("envelope error: {err}"))
    }
}

impl From<BreachError> for AppError {
    fn from(err: BreachError) -> Self {
        Self::BreachCheck(err.to_string())
    }
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
