//! `PostgreSQL` store.
//!
//! Persists users and credential records with parameterized sqlx queries —
//! no SQL injection surface. Ownership scoping is enforced in the queries
//! themselves (`WHERE id = $n AND user_id = $m`), so a missing row and a
//! foreign row are the same `NotFound`.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{EntryPatch, NewEntry, NewUser, StorageError, User, VaultEntry, VaultStore};

/// A [`VaultStore`] backed by `PostgreSQL`.
///
/// Thread-safe via `PgPool`. All operations are fully async.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &"[PgPool]")
            .finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Connect to `PostgreSQL` and create the schema if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the connection or schema setup
    /// fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend {
                reason: format!("connection failed: {e}"),
            })?;

        sqlx::query(
            r"CREATE TABLE IF NOT EXISTS users (
                id            UUID PRIMARY KEY,
                name          TEXT NOT NULL,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role          TEXT NOT NULL DEFAULT 'user',
                verified      BOOLEAN NOT NULL DEFAULT FALSE,
                created_at    TIMESTAMPTZ NOT NULL,
                updated_at    TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Backend {
            reason: format!("schema setup failed: {e}"),
        })?;

        sqlx::query(
            r"CREATE TABLE IF NOT EXISTS vault_entries (
                id                 UUID PRIMARY KEY,
                user_id            UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                site_name          TEXT NOT NULL,
                site_url           TEXT,
                username           TEXT,
                encrypted_password TEXT NOT NULL,
                notes              TEXT,
                created_at         TIMESTAMPTZ NOT NULL,
                updated_at         TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Backend {
            reason: format!("schema setup failed: {e}"),
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vault_entries_user_created \
             ON vault_entries (user_id, created_at DESC)",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Backend {
            reason: format!("schema setup failed: {e}"),
        })?;

        tracing::debug!("schema ensured");

        Ok(Self { pool })
    }

    /// Wrap an existing pool (for tests that manage their own schema).
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VaultStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, User>(
            r"INSERT INTO users (id, name, email, password_hash, role, verified, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
              RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.verified)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn mark_user_verified(&self, email: &str) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE users SET verified = TRUE, updated_at = $1 WHERE email = $2")
            .bind(Utc::now())
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_entries(&self, user_id: Uuid) -> Result<Vec<VaultEntry>, StorageError> {
        let entries = sqlx::query_as::<_, VaultEntry>(
            "SELECT * FROM vault_entries WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn create_entry(&self, entry: NewEntry) -> Result<VaultEntry, StorageError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, VaultEntry>(
            r"INSERT INTO vault_entries
                (id, user_id, site_name, site_url, username, encrypted_password, notes, created_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
              RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(&entry.site_name)
        .bind(&entry.site_url)
        .bind(&entry.username)
        .bind(&entry.encrypted_password)
        .bind(&entry.notes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_entry(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: EntryPatch,
    ) -> Result<VaultEntry, StorageError> {
        let record = sqlx::query_as::<_, VaultEntry>(
            r"UPDATE vault_entries
              SET site_name          = COALESCE($1, site_name),
                  site_url           = COALESCE($2, site_url),
                  username           = COALESCE($3, username),
                  encrypted_password = COALESCE($4, encrypted_password),
                  notes              = COALESCE($5, notes),
                  updated_at         = $6
              WHERE id = $7 AND user_id = $8
              RETURNING *",
        )
        .bind(&patch.site_name)
        .bind(&patch.site_url)
        .bind(&patch.username)
        .bind(&patch.encrypted_password)
        .bind(&patch.notes)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(record)
    }

    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM vault_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
