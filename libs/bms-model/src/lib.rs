//! Domain model for the BMS warning pipeline
//!
//! Plain data types shared by the evaluation engine, the stores and the
//! warning service:
//! - Signal: one telemetry reading with its parsed value object
//! - WarnRule / RuleCondition: threshold rules partitioned into severity buckets
//! - Warning: an immutable record of a rule breach
//! - Vehicle / BatteryType: lookup aggregates referenced by id

pub mod error;
pub mod rule;
pub mod signal;
pub mod vehicle;
pub mod warning;

pub use error::ModelError;
pub use rule::{RuleCondition, WarnExpr, WarnRule};
pub use signal::{Signal, SignalValues};
pub use vehicle::{BatteryType, Vehicle};
pub use warning::Warning;
