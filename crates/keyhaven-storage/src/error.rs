//! Error type for the storage layer.

/// Errors from the credential record store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The record does not exist or belongs to another user. The two cases
    /// are deliberately indistinguishable.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated (duplicate email).
    #[error("conflict: {reason}")]
    Conflict { reason: String },

    /// The underlying backend is unavailable or failed. Retryable by the
    /// caller, not by this layer.
    #[error("storage backend error: {reason}")]
    Backend { reason: String },
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err) => {
                // PostgreSQL unique violation
                if db_err.code().as_deref() == Some("23505") {
                    Self::Conflict {
                        reason: "resource already exists".to_owned(),
                    }
                } else {
                    Self::Backend {
                        reason: format!("database error: {db_err}"),
                    }
                }
            }
            _ => Self::Backend {
                reason: format!("database error: {err}"),
            },
        }
    }
}
