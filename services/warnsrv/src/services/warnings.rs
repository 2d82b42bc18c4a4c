//! Warning queries
//!
//! The by-car path is read-through cached: a hit returns without touching
//! the store, a miss falls through and repopulates the cache. The other
//! filter combinations query the store directly.

use crate::cache::WarningCache;
use crate::error::Result;
use bms_infra::{VehicleStore, WarningStore};
use bms_model::{BatteryType, Warning};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct WarningQueryService {
    warnings: WarningStore,
    vehicles: VehicleStore,
    cache: Arc<WarningCache>,
}

impl WarningQueryService {
    pub fn new(warnings: WarningStore, vehicles: VehicleStore, cache: Arc<WarningCache>) -> Self {
        Self {
            warnings,
            vehicles,
            cache,
        }
    }

    /// Cached by-car query
    pub async fn by_car(
        &self,
        car_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        if let Some(cached) = self.cache.get(car_id, from, to) {
            debug!("Warning cache hit for car {}", car_id);
            return Ok(cached);
        }

        let warnings = self.warnings.find_by_car(car_id, from, to).await?;
        self.cache.put(car_id, from, to, warnings.clone());
        Ok(warnings)
    }

    pub async fn by_battery_type(
        &self,
        battery_type_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        Ok(self
            .warnings
            .find_by_battery_type(battery_type_id, from, to)
            .await?)
    }

    pub async fn by_car_and_battery_type(
        &self,
        car_id: i32,
        battery_type_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        Ok(self
            .warnings
            .find_by_car_and_battery_type(car_id, battery_type_id, from, to)
            .await?)
    }

    pub async fn all(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Warning>> {
        Ok(self.warnings.find_in_range(from, to).await?)
    }

    /// Resolve the battery types referenced by a result set, keyed by id
    pub async fn battery_types_for(
        &self,
        battery_type_ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashMap<i32, BatteryType>> {
        let mut resolved = HashMap::new();
        for battery_type_id in battery_type_ids {
            if resolved.contains_key(&battery_type_id) {
                continue;
            }
            let battery_type = self.vehicles.battery_type_by_id(battery_type_id).await?;
            resolved.insert(battery_type_id, battery_type);
        }
        Ok(resolved)
    }
}

impl std::fmt::Debug for WarningQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarningQueryService").finish_non_exhaustive()
    }
}
