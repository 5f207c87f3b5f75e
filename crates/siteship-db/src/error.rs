//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl From<DbError> for siteship_core::Error {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => siteship_core::Error::NotFound(what),
            other => siteship_core::Error::Upstream(other.to_string()),
        }
    }
}
