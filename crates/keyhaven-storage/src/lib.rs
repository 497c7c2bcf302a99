//! Storage layer for `KeyHaven`.
//!
//! This crate defines the [`VaultStore`] trait — the repository interface for
//! user accounts and credential records. It knows nothing about encryption:
//! the `encrypted_password` column is an opaque envelope string produced by
//! `keyhaven-core` before it ever reaches this layer.
//!
//! Two implementations are provided:
//!
//! - [`PostgresStore`] — production default, backed by `PostgreSQL` via sqlx
//! - [`MemoryStore`] — in-memory, for testing and local development

mod error;
mod memory;
mod models;
mod postgres;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use models::{EntryPatch, NewEntry, NewUser, User, VaultEntry};
pub use postgres::PostgresStore;

use uuid::Uuid;

/// Repository for users and credential records.
///
/// All entry operations are scoped by the owning `user_id` — a record that
/// exists but belongs to another user is indistinguishable from one that does
/// not exist ([`StorageError::NotFound`] either way), so cross-user probing
/// leaks nothing.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait VaultStore: Send + Sync + 'static {
    /// Create a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if the email is already registered,
    /// [`StorageError::Backend`] if the backend fails.
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    /// Look up a user by email. Returns `Ok(None)` if no account exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the backend fails.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Look up a user by id. Returns `Ok(None)` if no account exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the backend fails.
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError>;

    /// Mark the account with the given email as verified.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no account has that email.
    async fn mark_user_verified(&self, email: &str) -> Result<(), StorageError>;

    /// List all credential records owned by `user_id`, newest first by
    /// creation time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the backend fails.
    async fn list_entries(&self, user_id: Uuid) -> Result<Vec<VaultEntry>, StorageError>;

    /// Persist a new credential record. The store assigns the id and
    /// timestamps; the password arrives already encrypted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the backend fails.
    async fn create_entry(&self, entry: NewEntry) -> Result<VaultEntry, StorageError>;

    /// Partially update a record owned by `user_id`. Fields absent from the
    /// patch keep their previous values (COALESCE semantics — a field cannot
    /// be cleared, only replaced).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record with that id belongs
    /// to that user.
    async fn update_entry(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
    ) -> Result<VaultEntry, StorageError>;

    /// Delete a record owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no record with that id belongs
    /// to that user.
    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<(), StorageError>;
}
