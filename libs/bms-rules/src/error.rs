//! Rule engine error types

use bms_model::ModelError;
use thiserror::Error;

/// Result type for rule evaluation
pub type Result<T> = std::result::Result<T, RuleError>;

/// Rule evaluation errors
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rule expression is outside the supported vocabulary
    #[error("Unsupported rule expression: {0}")]
    UnsupportedExpression(String),

    /// Domain model error surfaced during evaluation
    #[error("Model error: {0}")]
    Model(String),
}

impl From<ModelError> for RuleError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnsupportedExpression(expr) => RuleError::UnsupportedExpression(expr),
            other => RuleError::Model(other.to_string()),
        }
    }
}
