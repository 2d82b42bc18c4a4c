//! Shared test fixtures

use bms_model::{BatteryType, RuleCondition};
use rust_decimal::Decimal;
use std::str::FromStr;
use warnsrv::{AppState, WarnsrvConfig};

/// Build an application state over an in-memory database with the transport
/// disabled, so ingestion processes signals inline.
pub async fn test_state() -> AppState {
    let pool = bms_infra::sqlite::connect_in_memory().await.unwrap();
    bms_infra::sqlite::init_schema(&pool).await.unwrap();
    AppState::build(WarnsrvConfig::default(), pool)
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Severity buckets over the voltage difference:
/// (5, inf) -> 0, [3, 5) -> 1, [1, 3) -> 2, [0.6, 1) -> 3, [0.2, 0.6) -> 4
pub fn bucket_table() -> Vec<RuleCondition> {
    vec![
        RuleCondition::new(Some(dec("5")), None, 0),
        RuleCondition::new(Some(dec("3")), Some(dec("5")), 1),
        RuleCondition::new(Some(dec("1")), Some(dec("3")), 2),
        RuleCondition::new(Some(dec("0.6")), Some(dec("1")), 3),
        RuleCondition::new(Some(dec("0.2")), Some(dec("0.6")), 4),
    ]
}

/// Register a battery type, a vehicle with carId 7 and the bucket-table rule
pub async fn seed_car_with_bucket_rule(state: &AppState) -> BatteryType {
    let battery_type = state
        .vehicles
        .create_battery_type("NCM", "Ternary lithium")
        .await
        .unwrap();
    state.vehicles.create_vehicle(7, "NCM").await.unwrap();
    state
        .rules
        .create_rule(
            1,
            "voltage spread",
            "MX_MI",
            battery_type.battery_type_id,
            bucket_table(),
        )
        .await
        .unwrap();
    battery_type
}
