//! Persistence layer error types

use bms_model::ModelError;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row missing or soft-deleted
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint would be violated
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Stored value failed to hydrate into its domain type
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    /// Domain validation rejected the write
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
