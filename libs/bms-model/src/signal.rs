//! Signal domain model
//!
//! A signal is one telemetry reading reported by a vehicle's battery
//! management unit. The raw payload is kept as a JSON snapshot
//! (`signal_data`); the four numeric fields are parsed into [`SignalValues`]
//! on demand and never persisted separately.

use crate::error::{ModelError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Wire field names of a telemetry payload
const FIELD_MAX_VOLTAGE: &str = "Mx";
const FIELD_MIN_VOLTAGE: &str = "Mi";
const FIELD_MAX_CURRENT: &str = "Ix";
const FIELD_MIN_CURRENT: &str = "Ii";

/// One telemetry reading
///
/// `processed` transitions false -> true at most once and is the sole gate
/// controlling whether warning generation runs again for this signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub signal_id: i64,
    pub car_id: i32,
    pub battery_type_id: i32,
    /// JSON snapshot of the fields present in the reported payload
    pub signal_data: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Signal {
    /// Parse the stored snapshot back into the structured value object
    pub fn values(&self) -> Result<SignalValues> {
        SignalValues::parse(&self.signal_data)
    }
}

/// Parsed telemetry values, each field individually optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalValues {
    pub max_voltage: Option<Decimal>,
    pub min_voltage: Option<Decimal>,
    pub max_current: Option<Decimal>,
    pub min_current: Option<Decimal>,
}

impl SignalValues {
    /// Parse a raw telemetry payload.
    ///
    /// The payload must be a flat JSON object. Unknown keys are ignored with
    /// a logged warning; non-numeric values for known keys are treated as
    /// absent. Only a structural failure rejects the payload.
    pub fn parse(payload: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ModelError::InvalidPayload(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| ModelError::InvalidPayload("expected a JSON object".to_string()))?;

        let mut values = SignalValues::default();
        for (key, field) in object {
            let slot = match key.as_str() {
                FIELD_MAX_VOLTAGE => &mut values.max_voltage,
                FIELD_MIN_VOLTAGE => &mut values.min_voltage,
                FIELD_MAX_CURRENT => &mut values.max_current,
                FIELD_MIN_CURRENT => &mut values.min_current,
                other => {
                    warn!("Ignoring unrecognized signal field: {}", other);
                    continue;
                },
            };

            match parse_decimal(field) {
                Some(decimal) => *slot = Some(decimal),
                None => {
                    warn!("Ignoring non-numeric value for signal field {}: {}", key, field);
                },
            }
        }

        Ok(values)
    }

    /// Serialize back to the wire snapshot, emitting only present fields
    pub fn to_json(&self) -> String {
        let mut map = serde_json::Map::new();
        for (key, field) in [
            (FIELD_MAX_VOLTAGE, &self.max_voltage),
            (FIELD_MIN_VOLTAGE, &self.min_voltage),
            (FIELD_MAX_CURRENT, &self.max_current),
            (FIELD_MIN_CURRENT, &self.min_current),
        ] {
            if let Some(decimal) = field {
                if let Some(number) = decimal
                    .to_f64()
                    .and_then(serde_json::Number::from_f64)
                {
                    map.insert(key.to_string(), Value::Number(number));
                }
            }
        }
        Value::Object(map).to_string()
    }

    /// Mx - Mi, or None when either voltage is absent
    pub fn voltage_diff(&self) -> Option<Decimal> {
        match (self.max_voltage, self.min_voltage) {
            (Some(max), Some(min)) => Some(max - min),
            _ => None,
        }
    }

    /// Ix - Ii, or None when either current is absent
    pub fn current_diff(&self) -> Option<Decimal> {
        match (self.max_current, self.min_current) {
            (Some(max), Some(min)) => Some(max - min),
            _ => None,
        }
    }
}

/// Parse a JSON value as an exact decimal, rejecting non-numbers
fn parse_decimal(value: &Value) -> Option<Decimal> {
    let number = value.as_number()?;
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_full_payload() {
        let values = SignalValues::parse(r#"{"Mx":12.0,"Mi":0.6,"Ix":11.8,"Ii":2.5}"#).unwrap();
        assert_eq!(values.max_voltage, Some(dec("12.0")));
        assert_eq!(values.min_voltage, Some(dec("0.6")));
        assert_eq!(values.max_current, Some(dec("11.8")));
        assert_eq!(values.min_current, Some(dec("2.5")));
    }

    #[test]
    fn test_parse_ignores_unknown_and_non_numeric_fields() {
        let values =
            SignalValues::parse(r#"{"Mx":8.0,"Mi":"bad","Tz":99.0,"note":"x"}"#).unwrap();
        assert_eq!(values.max_voltage, Some(dec("8.0")));
        assert_eq!(values.min_voltage, None);
        assert_eq!(values.max_current, None);
        assert_eq!(values.min_current, None);
    }

    #[test]
    fn test_parse_rejects_structural_failures() {
        assert!(matches!(
            SignalValues::parse("not json"),
            Err(ModelError::InvalidPayload(_))
        ));
        assert!(matches!(
            SignalValues::parse("[1,2]"),
            Err(ModelError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let values = SignalValues::parse(r#"{"Mx":12.0,"Mi":0.6}"#).unwrap();
        let snapshot = values.to_json();
        let reparsed = SignalValues::parse(&snapshot).unwrap();
        assert_eq!(values, reparsed);
        assert!(!snapshot.contains("Ix"));
    }

    #[test]
    fn test_voltage_diff_requires_both_fields() {
        let values = SignalValues::parse(r#"{"Mx":12.0}"#).unwrap();
        assert_eq!(values.voltage_diff(), None);

        let values = SignalValues::parse(r#"{"Mx":12.0,"Mi":0.6}"#).unwrap();
        assert_eq!(values.voltage_diff(), Some(dec("11.4")));
    }

    #[test]
    fn test_current_diff() {
        let values = SignalValues::parse(r#"{"Ix":10.5,"Ii":2.0}"#).unwrap();
        assert_eq!(values.current_diff(), Some(dec("8.5")));
    }
}
