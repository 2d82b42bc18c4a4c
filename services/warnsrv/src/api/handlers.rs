//! API handlers for the warning service

use axum::{
    extract::{Query, State},
    response::Json,
};
use bms_model::Warning;

use crate::api::models::*;
use crate::error::{Result, WarnError};
use crate::AppState;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Ingest a batch of signals; items succeed or fail independently
pub async fn report_signals(
    State(state): State<AppState>,
    Json(requests): Json<Vec<SignalRequest>>,
) -> Json<Vec<SignalReportResponse>> {
    let outcomes = state
        .ingest
        .report_signals(
            requests
                .into_iter()
                .map(|request| (request.car_id, request.signal))
                .collect(),
        )
        .await;

    let responses = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok((signal, battery_type)) => SignalReportResponse {
                car_id: outcome.car_id,
                signal: Some(SignalResponse::from_parts(&signal, &battery_type)),
                error: None,
            },
            Err(e) => SignalReportResponse {
                car_id: outcome.car_id,
                signal: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Json(responses)
}

/// Query signals by time range, optionally scoped to one car
pub async fn list_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> Result<Json<Vec<SignalResponse>>> {
    let signals = match query.car_id {
        Some(car_id) => {
            state
                .ingest
                .signals_by_car(car_id, query.from, query.to)
                .await?
        },
        None => state.ingest.signals_in_range(query.from, query.to).await?,
    };

    let battery_type_ids: Vec<i32> = signals.iter().map(|s| s.battery_type_id).collect();
    let battery_types = state
        .warning_queries
        .battery_types_for(battery_type_ids)
        .await?;

    let mut responses = Vec::with_capacity(signals.len());
    for signal in &signals {
        let battery_type = battery_types
            .get(&signal.battery_type_id)
            .ok_or(WarnError::NotFound {
                entity: "BatteryType",
                id: signal.battery_type_id.to_string(),
            })?;
        responses.push(SignalResponse::from_parts(signal, battery_type));
    }

    Ok(Json(responses))
}

/// Query warnings by car / battery type / time range.
///
/// The car-only form is served through the read-through cache.
pub async fn list_warnings(
    State(state): State<AppState>,
    Query(query): Query<WarningQuery>,
) -> Result<Json<Vec<WarningResponse>>> {
    let warnings: Vec<Warning> = match (query.car_id, query.battery_type_id) {
        (Some(car_id), Some(battery_type_id)) => {
            state
                .warning_queries
                .by_car_and_battery_type(car_id, battery_type_id, query.from, query.to)
                .await?
        },
        (Some(car_id), None) => {
            state
                .warning_queries
                .by_car(car_id, query.from, query.to)
                .await?
        },
        (None, Some(battery_type_id)) => {
            state
                .warning_queries
                .by_battery_type(battery_type_id, query.from, query.to)
                .await?
        },
        (None, None) => state.warning_queries.all(query.from, query.to).await?,
    };

    let battery_type_ids: Vec<i32> = warnings.iter().map(|w| w.battery_type_id).collect();
    let battery_types = state
        .warning_queries
        .battery_types_for(battery_type_ids)
        .await?;

    let mut responses = Vec::with_capacity(warnings.len());
    for warning in &warnings {
        let battery_type = battery_types
            .get(&warning.battery_type_id)
            .ok_or(WarnError::NotFound {
                entity: "BatteryType",
                id: warning.battery_type_id.to_string(),
            })?;
        responses.push(WarningResponse::from_parts(warning, battery_type));
    }

    Ok(Json(responses))
}
