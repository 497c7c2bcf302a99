//! Domain models for the vault store.
//!
//! All ids are UUIDs, all timestamps UTC. The password hash on [`User`] is
//! the argon2 login hash — it plays no part in vault encryption. The
//! `encrypted_password` on [`VaultEntry`] is an opaque envelope string; this
//! crate never sees plaintext secrets.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered user account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a user. The id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub verified: bool,
}

/// One stored credential. Ownership (`user_id`) never transfers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VaultEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub site_name: String,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub encrypted_password: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a credential record.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub site_name: String,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub encrypted_password: String,
    pub notes: Option<String>,
}

/// Partial update for a credential record. `None` means "keep the current
/// value"; a new password must already be re-encrypted with a fresh nonce
/// before it reaches the store.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub site_name: Option<String>,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub encrypted_password: Option<String>,
    pub notes: Option<String>,
}
