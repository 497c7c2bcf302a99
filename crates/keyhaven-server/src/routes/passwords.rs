//! Vault routes: `/v1/passwords/*`
//!
//! CRUD over the authenticated user's credential records, plus the breach
//! check and password generator. Passwords are sealed before they reach the
//! store and opened on the way out; listing is the only operation that
//! returns plaintext.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keyhaven_core::breach::BreachReport;
use keyhaven_core::crypto::KeyProvider;
use keyhaven_core::envelope;
use keyhaven_core::generate;
use keyhaven_storage::{EntryPatch, NewEntry, VaultEntry};

use crate::error::AppError;
use crate::middleware::AuthedUser;
use crate::state::AppState;

/// Build the `/v1/passwords` router. All routes require authentication.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/{id}", put(update_entry).delete(delete_entry))
        .route("/check-breach", post(check_breach))
        .route("/generate", post(generate_password))
}

// ── Request / response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub site_name: String,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub password: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateEntryRequest {
    pub site_name: Option<String>,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckBreachRequest {
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct GenerateRequest {
    pub length: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedPassword {
    pub password: String,
}

/// A credential record with its password decrypted for the owner.
#[derive(Debug, Serialize)]
pub struct DecryptedEntry {
    pub id: Uuid,
    pub site_name: String,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub decrypted_password: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DecryptedEntry {
    fn new(entry: VaultEntry, decrypted_password: String) -> Self {
        Self {
            id: entry.id,
            site_name: entry.site_name,
            site_url: entry.site_url,
            username: entry.username,
            decrypted_password,
            notes: entry.notes,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub message: String,
    /// The stored record — password still in its encrypted envelope.
    pub entry: VaultEntry,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `GET /v1/passwords` — all of the caller's records, newest first, with
/// passwords decrypted.
///
/// A record that fails to decrypt fails the whole listing: a 500 here means
/// stored ciphertext is corrupt or the master key changed, and that should
/// surface loudly rather than silently shrink the list.
async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthedUser>,
) -> Result<Json<Vec<DecryptedEntry>>, AppError> {
    let entries = state.store.list_entries(auth.user_id).await?;
    let key = state.keys.current_key();

    let mut decrypted = Vec::with_capacity(entries.len());
    for entry in entries {
        let plaintext = envelope::open(key, &entry.encrypted_password)?;
        decrypted.push(DecryptedEntry::new(entry, plaintext));
    }

    Ok(Json(decrypted))
}

/// `POST /v1/passwords` — store a new credential record.
async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthedUser>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), AppError> {
    if req.site_name.trim().is_empty() {
        return Err(AppError::BadRequest("site_name is required".to_owned()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_owned()));
    }

    let encrypted_password = envelope::seal(state.keys.current_key(), &req.password)?;

    let entry = state
        .store
        .create_entry(NewEntry {
            user_id: auth.user_id,
            site_name: req.site_name.trim().to_owned(),
            site_url: req.site_url,
            username: req.username,
            encrypted_password,
            notes: req.notes,
        })
        .await?;

    tracing::info!(user_id = %auth.user_id, entry_id = %entry.id, "vault entry created");

    Ok((
        StatusCode::CREATED,
        Json(EntryResponse {
            message: "password saved".to_owned(),
            entry,
        }),
    ))
}

/// `PUT /v1/passwords/{id}` — partially update one of the caller's records.
///
/// Absent fields keep their current values. A new password is re-sealed
/// with a fresh nonce before it reaches the store.
async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthedUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    let encrypted_password = match req.password {
        Some(ref password) if password.is_empty() => {
            return Err(AppError::BadRequest("password must not be empty".to_owned()));
        }
        Some(ref password) => Some(envelope::seal(state.keys.current_key(), password)?),
        None => None,
    };

    let entry = state
        .store
        .update_entry(
            auth.user_id,
            id,
            EntryPatch {
                site_name: req.site_name,
                site_url: req.site_url,
                username: req.username,
                encrypted_password,
                notes: req.notes,
            },
        )
        .await?;

    tracing::info!(user_id = %auth.user_id, entry_id = %entry.id, "vault entry updated");

    Ok(Json(EntryResponse {
        message: "password updated".to_owned(),
        entry,
    }))
}

/// `DELETE /v1/passwords/{id}` — delete one of the caller's records.
async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete_entry(auth.user_id, id).await?;

    tracing::info!(user_id = %auth.user_id, entry_id = %id, "vault entry deleted");

    Ok(Json(MessageResponse {
        message: "password deleted".to_owned(),
    }))
}

/// `POST /v1/passwords/check-breach` — k-anonymity breach lookup.
///
/// The candidate password never leaves the server; only the first five
/// characters of its SHA-1 digest go to the range API.
async fn check_breach(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckBreachRequest>,
) -> Result<Json<BreachReport>, AppError> {
    if req.password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_owned()));
    }
    let report = state.breach.check(&req.password).await?;
    Ok(Json(report))
}

/// `POST /v1/passwords/generate` — generate a random password.
async fn generate_password(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GeneratedPassword>, AppError> {
    let length = req.length.unwrap_or(generate::DEFAULT_LENGTH);
    let password = generate::generate(length, generate::DEFAULT_ALPHABET)?;
    Ok(Json(GeneratedPassword { password }))
}
