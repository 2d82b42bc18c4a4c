//! Warning generator
//!
//! The single idempotent entry point for warning generation. Both the queue
//! consumer and the synchronous ingestion fallback call [`WarningGenerator::generate`];
//! there is deliberately no second implementation of this flow.

use crate::cache::WarningCache;
use crate::error::Result;
use bms_infra::{NewWarning, RuleStore, SignalStore, VehicleStore, WarningStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of one generation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The signal had already been processed; nothing was created and the
    /// cache was left untouched
    AlreadyProcessed,
    /// The signal was claimed and evaluated
    Completed { warnings_created: usize },
}

pub struct WarningGenerator {
    signals: SignalStore,
    vehicles: VehicleStore,
    rules: RuleStore,
    cache: Arc<WarningCache>,
}

impl WarningGenerator {
    pub fn new(
        signals: SignalStore,
        vehicles: VehicleStore,
        rules: RuleStore,
        cache: Arc<WarningCache>,
    ) -> Self {
        Self {
            signals,
            vehicles,
            rules,
            cache,
        }
    }

    /// Evaluate a signal against its battery type's rule set and persist one
    /// warning per matching rule.
    ///
    /// The transport redelivers at least once, so the processed flag is
    /// claimed with a transactional check-and-set: concurrent or redelivered
    /// invocations for the same signal cannot both pass it. A persistence
    /// failure while inserting warnings rolls the claim back, leaving the
    /// signal unprocessed for a safe retry of the whole pass.
    pub async fn generate(&self, signal_id: i64) -> Result<GenerationOutcome> {
        let signal = self.signals.find_by_id(signal_id).await?;

        if signal.processed {
            debug!("Signal {} already processed, skipping", signal_id);
            return Ok(GenerationOutcome::AlreadyProcessed);
        }

        let battery_type = self
            .vehicles
            .battery_type_by_id(signal.battery_type_id)
            .await?;
        let rules = self
            .rules
            .rules_for_battery_type(battery_type.battery_type_id)
            .await?;
        let values = signal.values()?;

        let matches = bms_rules::evaluate_batch(&rules, &values);

        let mut tx = self.signals.pool().begin().await?;

        if !SignalStore::claim_for_processing(&mut tx, signal_id).await? {
            // Lost the race against a concurrent pass for the same signal
            debug!("Signal {} claimed by another pass, skipping", signal_id);
            let _ = tx.rollback().await;
            return Ok(GenerationOutcome::AlreadyProcessed);
        }

        let mut warnings_created = 0;
        for rule in &rules {
            let Some(&warn_level) = matches.get(&rule.rule_id) else {
                continue;
            };

            let warning_id = WarningStore::insert_in_tx(
                &mut tx,
                &NewWarning {
                    car_id: signal.car_id,
                    battery_type_id: battery_type.battery_type_id,
                    rule_no: rule.rule_no,
                    rule_name: rule.name.clone(),
                    warn_level,
                    signal_data: signal.signal_data.clone(),
                },
            )
            .await?;
            warnings_created += 1;

            info!(
                "Warning {} generated: car {} rule {} level {}",
                warning_id, signal.car_id, rule.rule_no, warn_level
            );
        }

        tx.commit().await?;

        // Invalidation runs after the warnings are visible; it can never undo
        // the committed pass, so a cache problem stays a cache problem.
        if warnings_created > 0 {
            let removed = self.cache.invalidate(signal.car_id);
            debug!(
                "Dropped {} cached warning windows for car {}",
                removed, signal.car_id
            );
        }

        info!(
            "Signal {} processed: {} of {} rules matched",
            signal_id,
            warnings_created,
            rules.len()
        );

        Ok(GenerationOutcome::Completed { warnings_created })
    }
}

impl std::fmt::Debug for WarningGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarningGenerator").finish_non_exhaustive()
    }
}
