//! API routes configuration

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::api::handlers::*;
use crate::AppState;

/// Create the service router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/signals", get(list_signals).post(report_signals))
        .route("/api/warnings", get(list_warnings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
