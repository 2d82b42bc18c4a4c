//! Error types for the shared infrastructure layer

use thiserror::Error;

/// Result type for infrastructure operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Infrastructure errors
#[derive(Debug, Error)]
pub enum CommonError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(String),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redis::RedisError> for CommonError {
    fn from(err: redis::RedisError) -> Self {
        CommonError::Redis(err.to_string())
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        CommonError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for CommonError {
    fn from(err: serde_yaml::Error) -> Self {
        CommonError::Config(err.to_string())
    }
}
