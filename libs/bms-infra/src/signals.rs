//! Signal store
//!
//! Every read filters soft-deleted rows at the query boundary; the domain
//! never sees the delete flag. The processed-flag claim is a check-and-set
//! executed inside a caller-owned transaction so a failed generation pass
//! rolls the claim back.

use crate::error::{Result, StoreError};
use bms_model::Signal;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

#[derive(Debug, Clone)]
pub struct SignalStore {
    pool: SqlitePool,
}

impl SignalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persist a new, unprocessed signal
    pub async fn insert(
        &self,
        car_id: i32,
        battery_type_id: i32,
        signal_data: &str,
    ) -> Result<Signal> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO signal (car_id, battery_type_id, signal_data, processed, is_delete,
                                created_at, updated_at)
            VALUES (?, ?, ?, 0, 0, ?, ?)
            "#,
        )
        .bind(car_id)
        .bind(battery_type_id)
        .bind(signal_data)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Signal {
            signal_id: result.last_insert_rowid(),
            car_id,
            battery_type_id,
            signal_data: signal_data.to_string(),
            processed: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, signal_id: i64) -> Result<Signal> {
        let row = sqlx::query(
            r#"
            SELECT signal_id, car_id, battery_type_id, signal_data, processed,
                   created_at, updated_at
            FROM signal
            WHERE signal_id = ? AND is_delete = 0
            "#,
        )
        .bind(signal_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => hydrate_signal(row),
            None => Err(StoreError::not_found("Signal", signal_id)),
        }
    }

    /// Claim a signal for warning generation.
    ///
    /// Returns false when the signal was already processed (or concurrently
    /// claimed); the caller must then skip generation entirely.
    pub async fn claim_for_processing(
        conn: &mut SqliteConnection,
        signal_id: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE signal
            SET processed = 1, updated_at = ?
            WHERE signal_id = ? AND processed = 0 AND is_delete = 0
            "#,
        )
        .bind(Utc::now())
        .bind(signal_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_car(
        &self,
        car_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Signal>> {
        let rows = sqlx::query(
            r#"
            SELECT signal_id, car_id, battery_type_id, signal_data, processed,
                   created_at, updated_at
            FROM signal
            WHERE car_id = ? AND created_at >= ? AND created_at <= ? AND is_delete = 0
            ORDER BY created_at ASC, signal_id ASC
            "#,
        )
        .bind(car_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_signal).collect()
    }

    pub async fn find_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Signal>> {
        let rows = sqlx::query(
            r#"
            SELECT signal_id, car_id, battery_type_id, signal_data, processed,
                   created_at, updated_at
            FROM signal
            WHERE created_at >= ? AND created_at <= ? AND is_delete = 0
            ORDER BY created_at ASC, signal_id ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_signal).collect()
    }
}

fn hydrate_signal(row: SqliteRow) -> Result<Signal> {
    Ok(Signal {
        signal_id: row.try_get("signal_id")?,
        car_id: row.try_get("car_id")?,
        battery_type_id: row.try_get("battery_type_id")?,
        signal_data: row.try_get("signal_data")?,
        processed: row.try_get::<i64, _>("processed")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
