//! API request/response models

use bms_model::{BatteryType, Signal, Warning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One telemetry report
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequest {
    pub car_id: i32,
    /// Flat JSON object with the optional fields Mx / Mi / Ix / Ii
    pub signal: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResponse {
    pub signal_id: i64,
    pub car_id: i32,
    pub battery_type_id: i32,
    pub battery_type_code: String,
    pub battery_type_name: String,
    pub signal_data: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl SignalResponse {
    pub fn from_parts(signal: &Signal, battery_type: &BatteryType) -> Self {
        Self {
            signal_id: signal.signal_id,
            car_id: signal.car_id,
            battery_type_id: battery_type.battery_type_id,
            battery_type_code: battery_type.code.clone(),
            battery_type_name: battery_type.name.clone(),
            signal_data: signal.signal_data.clone(),
            processed: signal.processed,
            created_at: signal.created_at,
        }
    }
}

/// Per-item result of a batch report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReportResponse {
    pub car_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalQuery {
    pub car_id: Option<i32>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningQuery {
    pub car_id: Option<i32>,
    pub battery_type_id: Option<i32>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningResponse {
    pub warning_id: i64,
    pub car_id: i32,
    pub battery_type_id: i32,
    pub battery_type_code: String,
    pub battery_type_name: String,
    pub rule_no: i32,
    pub rule_name: String,
    pub warn_level: i32,
    pub signal_data: String,
    pub created_at: DateTime<Utc>,
}

impl WarningResponse {
    pub fn from_parts(warning: &Warning, battery_type: &BatteryType) -> Self {
        Self {
            warning_id: warning.warning_id,
            car_id: warning.car_id,
            battery_type_id: battery_type.battery_type_id,
            battery_type_code: battery_type.code.clone(),
            battery_type_name: battery_type.name.clone(),
            rule_no: warning.rule_no,
            rule_name: warning.rule_name.clone(),
            warn_level: warning.warn_level,
            signal_data: warning.signal_data.clone(),
            created_at: warning.created_at,
        }
    }
}
