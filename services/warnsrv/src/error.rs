//! Service error types and HTTP status mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bms_infra::StoreError;
use bms_model::ModelError;
use serde_json::json;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, WarnError>;

/// Warning pipeline errors
#[derive(Debug, Error)]
pub enum WarnError {
    /// Missing signal, vehicle, battery type or rule
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Telemetry body failed structural parsing
    #[error("Invalid signal payload: {0}")]
    InvalidPayload(String),

    /// Persistence failure; the current pass aborts and the signal stays
    /// unprocessed for redelivery
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cache or transport failure; never propagated past the pipeline
    /// boundary that logged it
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<StoreError> for WarnError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => WarnError::NotFound { entity, id },
            StoreError::Model(ModelError::InvalidPayload(msg)) => WarnError::InvalidPayload(msg),
            other => WarnError::Storage(other.to_string()),
        }
    }
}

impl From<ModelError> for WarnError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidPayload(msg) => WarnError::InvalidPayload(msg),
            other => WarnError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for WarnError {
    fn from(err: sqlx::Error) -> Self {
        WarnError::Storage(err.to_string())
    }
}

impl IntoResponse for WarnError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WarnError::NotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            WarnError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            WarnError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
            WarnError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = WarnError::NotFound {
            entity: "Signal",
            id: "42".to_string(),
        };
        assert_eq!(format!("{}", error), "Signal not found: 42");
    }

    #[test]
    fn test_store_error_mapping() {
        let error: WarnError = StoreError::not_found("Vehicle", 7).into();
        assert!(matches!(error, WarnError::NotFound { .. }));

        let error: WarnError = ModelError::InvalidPayload("not json".into()).into();
        assert!(matches!(error, WarnError::InvalidPayload(_)));
    }
}
