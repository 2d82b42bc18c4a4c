//! Warning domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable record of a rule breach for one signal
///
/// Created exactly once per (signal, matching rule) pair; never mutated
/// afterwards except by soft delete at the storage boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub warning_id: i64,
    pub car_id: i32,
    pub battery_type_id: i32,
    pub rule_no: i32,
    pub rule_name: String,
    pub warn_level: i32,
    /// Snapshot of the triggering signal's raw data
    pub signal_data: String,
    pub created_at: DateTime<Utc>,
}
