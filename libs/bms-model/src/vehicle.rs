//! Vehicle and battery type lookup aggregates
//!
//! Referenced by identifier from signals and warnings; no in-memory
//! back-pointers between aggregates.

use serde::{Deserialize, Serialize};

/// A registered vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Internal vehicle identifier (16 characters)
    pub vid: String,
    /// External vehicle identifier used on the wire
    pub car_id: i32,
    pub battery_type_id: i32,
}

/// Battery chemistry/model classification scoping which rules apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryType {
    pub battery_type_id: i32,
    pub code: String,
    pub name: String,
}
