//! Signal transport over Redis pub/sub
//!
//! Delivery is at-least-once at best and unordered; all correctness rests on
//! the generator's idempotency, not on transport guarantees.

pub mod consumer;
pub mod producer;

use serde::{Deserialize, Serialize};

pub use consumer::start_signal_consumer;
pub use producer::SignalProducer;

/// Message published per persisted signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalMessage {
    pub signal_id: i64,
}
