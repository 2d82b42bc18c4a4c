//! SQLite persistence layer for the BMS warning pipeline
//!
//! Stores hydrate rows into domain types and filter soft-deleted records at
//! the query boundary, so the engine and the warning generator never see the
//! delete flag.

pub mod error;
pub mod rules;
pub mod signals;
pub mod sqlite;
pub mod vehicles;
pub mod warnings;

pub use error::{Result, StoreError};
pub use rules::RuleStore;
pub use signals::SignalStore;
pub use vehicles::VehicleStore;
pub use warnings::{NewWarning, WarningStore};
