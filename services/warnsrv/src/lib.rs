//! Battery signal warning service
//!
//! Ingests vehicle battery telemetry, evaluates it against per-battery-type
//! threshold rules and produces warnings. Generation runs through a single
//! idempotent entry point reachable from the Redis consumer or inline when
//! the transport is disabled.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod mq;
pub mod services;

pub use cache::WarningCache;
pub use config::WarnsrvConfig;
pub use error::{Result, WarnError};

use bms_infra::{RuleStore, SignalStore, VehicleStore, WarningStore};
use mq::SignalProducer;
use services::{SignalIngest, WarningGenerator, WarningQueryService};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across handlers and background tasks
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WarnsrvConfig>,
    pub signals: SignalStore,
    pub warnings: WarningStore,
    pub vehicles: VehicleStore,
    pub rules: RuleStore,
    pub cache: Arc<WarningCache>,
    pub generator: Arc<WarningGenerator>,
    pub ingest: Arc<SignalIngest>,
    pub warning_queries: Arc<WarningQueryService>,
}

impl AppState {
    /// Wire the stores, cache, transport and services over an open pool
    pub fn build(config: WarnsrvConfig, pool: SqlitePool) -> Self {
        let signals = SignalStore::new(pool.clone());
        let warnings = WarningStore::new(pool.clone());
        let vehicles = VehicleStore::new(pool.clone());
        let rules = RuleStore::new(pool);

        let cache = Arc::new(WarningCache::new(config.cache.ttl_secs));
        let generator = Arc::new(WarningGenerator::new(
            signals.clone(),
            vehicles.clone(),
            rules.clone(),
            cache.clone(),
        ));
        let producer = Arc::new(SignalProducer::new(&config));
        let ingest = Arc::new(SignalIngest::new(
            signals.clone(),
            vehicles.clone(),
            producer,
            generator.clone(),
            config.mq.enabled,
        ));
        let warning_queries = Arc::new(WarningQueryService::new(
            warnings.clone(),
            vehicles.clone(),
            cache.clone(),
        ));

        Self {
            config: Arc::new(config),
            signals,
            warnings,
            vehicles,
            rules,
            cache,
            generator,
            ingest,
            warning_queries,
        }
    }
}
