//! Warning query cache
//!
//! Read-through cache for by-car warning queries. Keys are
//! `(car_id, from, to)`; invalidation is deliberately coarser than the key
//! and drops every window for a car id. Entries carry an absolute expiry so
//! a missed invalidation only produces bounded staleness.

use bms_model::Warning;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

type CacheKey = (i32, DateTime<Utc>, DateTime<Utc>);

#[derive(Debug, Clone)]
struct CacheEntry {
    warnings: Vec<Warning>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WarningCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl WarningCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Cached result for the exact window, if present and unexpired.
    ///
    /// Expired entries are dropped on access.
    pub fn get(&self, car_id: i32, from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Vec<Warning>> {
        let key = (car_id, from, to);
        let now = Utc::now();

        let entry = self.entries.get(&key)?;
        if entry.expires_at <= now {
            drop(entry);
            self.entries.remove_if(&key, |_, e| e.expires_at <= now);
            return None;
        }
        Some(entry.warnings.clone())
    }

    pub fn put(&self, car_id: i32, from: DateTime<Utc>, to: DateTime<Utc>, warnings: Vec<Warning>) {
        self.entries.insert(
            (car_id, from, to),
            CacheEntry {
                warnings,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    /// Drop every cached window for the car id; returns the number of entries
    /// removed
    pub fn invalidate(&self, car_id: i32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.0 != car_id);
        let removed = before - self.entries.len();
        debug!("Invalidated {} warning cache entries for car {}", removed, car_id);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(car_id: i32, warn_level: i32) -> Warning {
        Warning {
            warning_id: 1,
            car_id,
            battery_type_id: 1,
            rule_no: 1,
            rule_name: "voltage spread".to_string(),
            warn_level,
            signal_data: "{}".to_string(),
            created_at: Utc::now(),
        }
    }

    fn window(hours_back: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::hours(hours_back), now)
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let cache = WarningCache::new(3600);
        let (from, to) = window(1);

        cache.put(1, from, to, vec![warning(1, 0)]);
        let hit = cache.get(1, from, to).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].warn_level, 0);
    }

    #[test]
    fn test_different_window_is_a_miss() {
        let cache = WarningCache::new(3600);
        let (from, to) = window(1);
        cache.put(1, from, to, vec![warning(1, 0)]);

        let (other_from, other_to) = window(2);
        assert!(cache.get(1, other_from, other_to).is_none());
    }

    #[test]
    fn test_invalidate_clears_every_window_for_the_car() {
        let cache = WarningCache::new(3600);
        let (from_a, to_a) = window(1);
        let (from_b, to_b) = window(2);

        cache.put(1, from_a, to_a, vec![warning(1, 0)]);
        cache.put(1, from_b, to_b, vec![warning(1, 2)]);
        cache.put(2, from_a, to_a, vec![warning(2, 1)]);

        assert_eq!(cache.invalidate(1), 2);
        assert!(cache.get(1, from_a, to_a).is_none());
        assert!(cache.get(1, from_b, to_b).is_none());
        // Other cars are untouched
        assert!(cache.get(2, from_a, to_a).is_some());
    }

    #[test]
    fn test_invalidate_unknown_car_removes_nothing() {
        let cache = WarningCache::new(3600);
        let (from, to) = window(1);
        cache.put(1, from, to, vec![]);

        assert_eq!(cache.invalidate(99), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_is_dropped() {
        let cache = WarningCache::new(0);
        let (from, to) = window(1);
        cache.put(1, from, to, vec![warning(1, 0)]);

        assert!(cache.get(1, from, to).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_result_lists_are_cached() {
        let cache = WarningCache::new(3600);
        let (from, to) = window(1);
        cache.put(1, from, to, vec![]);

        let hit = cache.get(1, from, to);
        assert_eq!(hit, Some(vec![]));
    }
}
