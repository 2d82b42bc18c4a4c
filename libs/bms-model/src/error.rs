//! Domain model error types

use thiserror::Error;

/// Result type for domain operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Domain model errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Condition interval intersects an existing condition on the same rule
    #[error("Condition [{new}] overlaps existing condition [{existing}]")]
    OverlappingCondition { new: String, existing: String },

    /// Rule expression is not part of the supported vocabulary
    #[error("Unsupported rule expression: {0}")]
    UnsupportedExpression(String),

    /// Telemetry payload could not be parsed structurally
    #[error("Invalid signal payload: {0}")]
    InvalidPayload(String),
}
