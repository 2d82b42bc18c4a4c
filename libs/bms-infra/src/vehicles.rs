//! Vehicle and battery type store

use crate::error::{Result, StoreError};
use bms_model::{BatteryType, Vehicle};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct VehicleStore {
    pool: SqlitePool,
}

impl VehicleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_battery_type(&self, code: &str, name: &str) -> Result<BatteryType> {
        if self.battery_type_by_code(code).await.is_ok() {
            return Err(StoreError::AlreadyExists(format!("BatteryType {}", code)));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO battery_type (code, name, is_delete, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?)
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(BatteryType {
            battery_type_id: result.last_insert_rowid() as i32,
            code: code.to_string(),
            name: name.to_string(),
        })
    }

    pub async fn battery_type_by_id(&self, battery_type_id: i32) -> Result<BatteryType> {
        let row = sqlx::query(
            r#"
            SELECT battery_type_id, code, name
            FROM battery_type
            WHERE battery_type_id = ? AND is_delete = 0
            "#,
        )
        .bind(battery_type_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(BatteryType {
                battery_type_id: row.try_get("battery_type_id")?,
                code: row.try_get("code")?,
                name: row.try_get("name")?,
            }),
            None => Err(StoreError::not_found("BatteryType", battery_type_id)),
        }
    }

    pub async fn battery_type_by_code(&self, code: &str) -> Result<BatteryType> {
        let row = sqlx::query(
            r#"
            SELECT battery_type_id, code, name
            FROM battery_type
            WHERE code = ? AND is_delete = 0
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(BatteryType {
                battery_type_id: row.try_get("battery_type_id")?,
                code: row.try_get("code")?,
                name: row.try_get("name")?,
            }),
            None => Err(StoreError::not_found("BatteryType", code)),
        }
    }

    /// Register a vehicle; rejects duplicate car ids
    pub async fn create_vehicle(&self, car_id: i32, battery_type_code: &str) -> Result<Vehicle> {
        if self.find_by_car_id(car_id).await.is_ok() {
            return Err(StoreError::AlreadyExists(format!("Vehicle carId {}", car_id)));
        }

        let battery_type = self.battery_type_by_code(battery_type_code).await?;
        let vid = generate_vid();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO vehicle (vid, car_id, battery_type_id, is_delete, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&vid)
        .bind(car_id)
        .bind(battery_type.battery_type_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Vehicle {
            vid,
            car_id,
            battery_type_id: battery_type.battery_type_id,
        })
    }

    pub async fn find_by_car_id(&self, car_id: i32) -> Result<Vehicle> {
        let row = sqlx::query(
            r#"
            SELECT vid, car_id, battery_type_id
            FROM vehicle
            WHERE car_id = ? AND is_delete = 0
            "#,
        )
        .bind(car_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Vehicle {
                vid: row.try_get("vid")?,
                car_id: row.try_get("car_id")?,
                battery_type_id: row.try_get("battery_type_id")?,
            }),
            None => Err(StoreError::not_found("Vehicle", car_id)),
        }
    }
}

/// 16-character vehicle identifier
fn generate_vid() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}
