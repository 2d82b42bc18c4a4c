//! Warning store
//!
//! Warnings are inserted inside the generator's claim transaction and are
//! immutable afterwards; reads filter soft-deleted rows.

use crate::error::Result;
use bms_model::Warning;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Fields of a warning about to be persisted
#[derive(Debug, Clone)]
pub struct NewWarning {
    pub car_id: i32,
    pub battery_type_id: i32,
    pub rule_no: i32,
    pub rule_name: String,
    pub warn_level: i32,
    pub signal_data: String,
}

#[derive(Debug, Clone)]
pub struct WarningStore {
    pool: SqlitePool,
}

impl WarningStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a warning as part of the caller's transaction
    pub async fn insert_in_tx(conn: &mut SqliteConnection, warning: &NewWarning) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO warnings (car_id, battery_type_id, rule_no, rule_name, warn_level,
                                  signal_data, is_delete, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(warning.car_id)
        .bind(warning.battery_type_id)
        .bind(warning.rule_no)
        .bind(&warning.rule_name)
        .bind(warning.warn_level)
        .bind(&warning.signal_data)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_car(
        &self,
        car_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        let rows = sqlx::query(&select_where(
            "car_id = ? AND created_at >= ? AND created_at <= ?",
        ))
        .bind(car_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_warning).collect()
    }

    pub async fn find_by_battery_type(
        &self,
        battery_type_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        let rows = sqlx::query(&select_where(
            "battery_type_id = ? AND created_at >= ? AND created_at <= ?",
        ))
        .bind(battery_type_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_warning).collect()
    }

    pub async fn find_by_car_and_battery_type(
        &self,
        car_id: i32,
        battery_type_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        let rows = sqlx::query(&select_where(
            "car_id = ? AND battery_type_id = ? AND created_at >= ? AND created_at <= ?",
        ))
        .bind(car_id)
        .bind(battery_type_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_warning).collect()
    }

    pub async fn find_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Warning>> {
        let rows = sqlx::query(&select_where("created_at >= ? AND created_at <= ?"))
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(hydrate_warning).collect()
    }
}

fn select_where(predicate: &str) -> String {
    format!(
        r#"
        SELECT warning_id, car_id, battery_type_id, rule_no, rule_name, warn_level,
               signal_data, created_at
        FROM warnings
        WHERE {} AND is_delete = 0
        ORDER BY created_at ASC, warning_id ASC
        "#,
        predicate
    )
}

fn hydrate_warning(row: SqliteRow) -> Result<Warning> {
    Ok(Warning {
        warning_id: row.try_get("warning_id")?,
        car_id: row.try_get("car_id")?,
        battery_type_id: row.try_get("battery_type_id")?,
        rule_no: row.try_get("rule_no")?,
        rule_name: row.try_get("rule_name")?,
        warn_level: row.try_get("warn_level")?,
        signal_data: row.try_get("signal_data")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite;
    use chrono::Duration;

    async fn store() -> WarningStore {
        let pool = sqlite::connect_in_memory().await.unwrap();
        sqlite::init_schema(&pool).await.unwrap();
        WarningStore::new(pool)
    }

    fn new_warning(car_id: i32, battery_type_id: i32, warn_level: i32) -> NewWarning {
        NewWarning {
            car_id,
            battery_type_id,
            rule_no: 1,
            rule_name: "voltage spread".to_string(),
            warn_level,
            signal_data: r#"{"Mx":12.0,"Mi":0.6}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_query_by_car() {
        let store = store().await;

        let mut tx = store.pool.begin().await.unwrap();
        WarningStore::insert_in_tx(&mut tx, &new_warning(7, 1, 0))
            .await
            .unwrap();
        WarningStore::insert_in_tx(&mut tx, &new_warning(8, 1, 2))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let now = Utc::now();
        let warnings = store
            .find_by_car(7, now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].warn_level, 0);
        assert_eq!(warnings[0].rule_name, "voltage spread");
    }

    #[tokio::test]
    async fn test_rolled_back_insert_is_invisible() {
        let store = store().await;

        let mut tx = store.pool.begin().await.unwrap();
        WarningStore::insert_in_tx(&mut tx, &new_warning(7, 1, 0))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let now = Utc::now();
        let warnings = store
            .find_in_range(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_combined_filters() {
        let store = store().await;

        let mut tx = store.pool.begin().await.unwrap();
        WarningStore::insert_in_tx(&mut tx, &new_warning(7, 1, 0))
            .await
            .unwrap();
        WarningStore::insert_in_tx(&mut tx, &new_warning(7, 2, 1))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let now = Utc::now();
        let (from, to) = (now - Duration::hours(1), now + Duration::hours(1));

        assert_eq!(store.find_by_battery_type(2, from, to).await.unwrap().len(), 1);
        assert_eq!(
            store
                .find_by_car_and_battery_type(7, 1, from, to)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.find_in_range(from, to).await.unwrap().len(), 2);
    }
}
