//! Signal ingestion
//!
//! Parses telemetry payloads, persists signals and hands them to the
//! transport. Batch items are isolated: one failing item never rolls back or
//! blocks the others. A persisted-but-unpublished signal is a valid terminal
//! state here.

use crate::error::{Result, WarnError};
use crate::mq::SignalProducer;
use crate::services::generator::WarningGenerator;
use bms_infra::{SignalStore, VehicleStore};
use bms_model::{BatteryType, Signal, SignalValues};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of one batch item
#[derive(Debug)]
pub struct ReportOutcome {
    pub car_id: i32,
    pub result: Result<(Signal, BatteryType)>,
}

pub struct SignalIngest {
    signals: SignalStore,
    vehicles: VehicleStore,
    producer: Arc<SignalProducer>,
    generator: Arc<WarningGenerator>,
    mq_enabled: bool,
}

impl SignalIngest {
    pub fn new(
        signals: SignalStore,
        vehicles: VehicleStore,
        producer: Arc<SignalProducer>,
        generator: Arc<WarningGenerator>,
        mq_enabled: bool,
    ) -> Self {
        Self {
            signals,
            vehicles,
            producer,
            generator,
            mq_enabled,
        }
    }

    /// Ingest a batch of telemetry payloads with per-item isolation
    pub async fn report_signals(&self, requests: Vec<(i32, String)>) -> Vec<ReportOutcome> {
        info!("Ingesting {} signal requests", requests.len());
        let mut outcomes = Vec::with_capacity(requests.len());

        for (car_id, payload) in requests {
            let result = self.report_one(car_id, &payload).await;
            if let Err(e) = &result {
                error!("Failed to ingest signal for car {}: {}", car_id, e);
            }
            outcomes.push(ReportOutcome { car_id, result });
        }

        outcomes
    }

    async fn report_one(&self, car_id: i32, payload: &str) -> Result<(Signal, BatteryType)> {
        let vehicle = self.vehicles.find_by_car_id(car_id).await?;
        let battery_type = self
            .vehicles
            .battery_type_by_id(vehicle.battery_type_id)
            .await?;

        let values = SignalValues::parse(payload)?;
        let signal = self
            .signals
            .insert(car_id, battery_type.battery_type_id, &values.to_json())
            .await?;
        info!("Signal {} persisted for car {}", signal.signal_id, car_id);

        // Ingestion is successful from here on, whatever the transport does
        self.producer.send(signal.signal_id).await;

        if !self.mq_enabled {
            // Synchronous fallback: same generator entry point as the consumer
            if let Err(e) = self.generator.generate(signal.signal_id).await {
                error!(
                    "Direct processing failed for signal {}: {}",
                    signal.signal_id, e
                );
            }
        }

        // Re-read so the response reflects a possible inline processing pass
        let signal = self.signals.find_by_id(signal.signal_id).await?;
        Ok((signal, battery_type))
    }

    pub async fn signals_by_car(
        &self,
        car_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Signal>> {
        Ok(self.signals.find_by_car(car_id, from, to).await?)
    }

    pub async fn signals_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Signal>> {
        Ok(self.signals.find_in_range(from, to).await?)
    }

    pub async fn battery_type_by_id(&self, battery_type_id: i32) -> Result<BatteryType> {
        self.vehicles
            .battery_type_by_id(battery_type_id)
            .await
            .map_err(WarnError::from)
    }
}

impl std::fmt::Debug for SignalIngest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalIngest")
            .field("mq_enabled", &self.mq_enabled)
            .finish_non_exhaustive()
    }
}
