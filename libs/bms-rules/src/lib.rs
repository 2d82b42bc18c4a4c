//! Rule evaluation engine
//!
//! Pure evaluation of per-battery-type threshold rules against parsed signal
//! values. The engine knows nothing about persistence or soft deletion; it
//! receives live rules and returns severities.

pub mod error;
pub mod evaluator;

pub use error::{Result, RuleError};
pub use evaluator::{compute_difference, evaluate, evaluate_batch};
