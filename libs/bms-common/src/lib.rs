//! Shared infrastructure for the BMS warning pipeline.
//!
//! Exposes the layered configuration loader, tracing setup and the async
//! Redis client used by the signal transport.

pub mod config;
pub mod error;
pub mod logging;
pub mod redis;

pub use config::ConfigLoader;
pub use error::{CommonError, Result};
pub use redis::RedisClient;
