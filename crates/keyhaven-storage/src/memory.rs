//! In-memory store for testing and local development.
//!
//! Keeps users and entries in `HashMap`s behind a `RwLock`. Not persistent —
//! all data is lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{EntryPatch, NewEntry, NewUser, StorageError, User, VaultEntry, VaultStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    entries: HashMap<Uuid, VaultEntry>,
}

/// An in-memory [`VaultStore`] backed by `HashMap`s.
///
/// Thread-safe and async-compatible. Cloning is cheap and shares the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VaultStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict {
                reason: "email already registered".to_owned(),
            });
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            verified: user.verified,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn mark_user_verified(&self, email: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or(StorageError::NotFound)?;
        user.verified = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_entries(&self, user_id: Uuid) -> Result<Vec<VaultEntry>, StorageError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<VaultEntry> = tables
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<VaultEntry, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let record = VaultEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            site_name: entry.site_name,
            site_url: entry.site_url,
            username: entry.username,
            encrypted_password: entry.encrypted_password,
            notes: entry.notes,
            created_at: now,
            updated_at: now,
        };
        tables.entries.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
    ) -> Result<VaultEntry, StorageError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .entries
            .get_mut(&id)
            .filter(|e| e.user_id == user_id)
            .ok_or(StorageError::NotFound)?;

        if let Some(site_name) = patch.site_name {
            entry.site_name = site_name;
        }
        if let Some(site_url) = patch.site_url {
            entry.site_url = Some(site_url);
        }
        if let Some(username) = patch.username {
            entry.username = Some(username);
        }
        if let Some(encrypted_password) = patch.encrypted_password {
            entry.encrypted_password = encrypted_password;
        }
        if let Some(notes) = patch.notes {
            entry.notes = Some(notes);
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .entries
            .get(&id)
            .is_some_and(|e| e.user_id == user_id);
        if !owned {
            return Err(StorageError::NotFound);
        }
        tables.entries.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_owned(),
            email: email.to_owned(),
            password_hash: "$argon2id$fake".to_owned(),
            role: "user".to_owned(),
            verified: false,
        }
    }

    fn new_entry(user_id: Uuid, site: &str) -> NewEntry {
        NewEntry {
            user_id,
            site_name: site.to_owned(),
            site_url: Some(format!("https://{site}.example")),
            username: Some("alice".to_owned()),
            encrypted_password: "v2:00:00".to_owned(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_user_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        let err = store
            .create_user(new_user("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn find_user_by_email_missing_returns_none() {
        let store = MemoryStore::new();
        assert!(
            store
                .find_user_by_email("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn mark_verified_flips_flag() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        assert!(!user.verified);
        store.mark_user_verified("a@example.com").await.unwrap();
        let user = store
            .find_user_by_id(user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(user.verified);
    }

    #[tokio::test]
    async fn mark_verified_unknown_email_not_found() {
        let store = MemoryStore::new();
        let err = store
            .mark_user_verified("nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        for site in ["first", "second", "third"] {
            store.create_entry(new_entry(user.id, site)).await.unwrap();
            // Distinct creation timestamps.
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let entries = store.list_entries(user.id).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.site_name.as_str()).collect();
        assert_eq!(names, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("a@example.com")).await.unwrap();
        let bob = store.create_user(new_user("b@example.com")).await.unwrap();
        store
            .create_entry(new_entry(alice.id, "github"))
            .await
            .unwrap();

        assert_eq!(store.list_entries(alice.id).await.unwrap().len(), 1);
        assert!(store.list_entries(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cross_user_update_is_not_found() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("a@example.com")).await.unwrap();
        let bob = store.create_user(new_user("b@example.com")).await.unwrap();
        let entry = store
            .create_entry(new_entry(alice.id, "github"))
            .await
            .unwrap();

        let err = store
            .update_entry(bob.id, entry.id, EntryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn cross_user_delete_is_not_found() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("a@example.com")).await.unwrap();
        let bob = store.create_user(new_user("b@example.com")).await.unwrap();
        let entry = store
            .create_entry(new_entry(alice.id, "github"))
            .await
            .unwrap();

        let err = store.delete_entry(bob.id, entry.id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        // Alice's entry survived the attempt.
        assert_eq!(store.list_entries(alice.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn partial_update_preserves_untouched_fields() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        let entry = store
            .create_entry(new_entry(user.id, "github"))
            .await
            .unwrap();

        let updated = store
            .update_entry(
                user.id,
                entry.id,
                EntryPatch {
                    notes: Some("rotated quarterly".to_owned()),
                    ..EntryPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.site_name, entry.site_name);
        assert_eq!(updated.username, entry.username);
        assert_eq!(updated.encrypted_password, entry.encrypted_password);
        assert_eq!(updated.notes.as_deref(), Some("rotated quarterly"));
        assert!(updated.updated_at >= entry.updated_at);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        let entry = store
            .create_entry(new_entry(user.id, "github"))
            .await
            .unwrap();

        store.delete_entry(user.id, entry.id).await.unwrap();
        assert!(store.list_entries(user.id).await.unwrap().is_empty());

        let err = store.delete_entry(user.id, entry.id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
