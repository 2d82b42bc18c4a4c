//! SQLite pool setup and schema bootstrap

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open a file-backed pool, creating the database (and parent directory) if
/// missing
pub async fn connect(path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| crate::error::StoreError::Database(e.to_string()))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("Opened SQLite database: {}", path);
    Ok(pool)
}

/// Open an in-memory pool (single connection so every query sees the same
/// database); used by tests and the mq-disabled development mode
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// Create the schema when absent.
///
/// Decimal bounds are stored as TEXT for an exact round-trip through
/// `rust_decimal`; timestamps are RFC 3339 TEXT.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS battery_type (
            battery_type_id INTEGER PRIMARY KEY AUTOINCREMENT,
            code            TEXT    NOT NULL UNIQUE,
            name            TEXT    NOT NULL,
            is_delete       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vehicle (
            vid             TEXT    PRIMARY KEY,
            car_id          INTEGER NOT NULL UNIQUE,
            battery_type_id INTEGER NOT NULL,
            is_delete       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS warn_rule (
            rule_id         INTEGER PRIMARY KEY AUTOINCREMENT,
            rule_no         INTEGER NOT NULL,
            name            TEXT    NOT NULL,
            expr            TEXT    NOT NULL,
            battery_type_id INTEGER NOT NULL,
            is_delete       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS warn_rule_item (
            item_id    INTEGER PRIMARY KEY AUTOINCREMENT,
            rule_id    INTEGER NOT NULL,
            min_val    TEXT,
            max_val    TEXT,
            warn_level INTEGER NOT NULL,
            is_delete  INTEGER NOT NULL DEFAULT 0,
            created_at TEXT    NOT NULL,
            updated_at TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS signal (
            signal_id       INTEGER PRIMARY KEY AUTOINCREMENT,
            car_id          INTEGER NOT NULL,
            battery_type_id INTEGER NOT NULL,
            signal_data     TEXT    NOT NULL,
            processed       INTEGER NOT NULL DEFAULT 0,
            is_delete       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS warnings (
            warning_id      INTEGER PRIMARY KEY AUTOINCREMENT,
            car_id          INTEGER NOT NULL,
            battery_type_id INTEGER NOT NULL,
            rule_no         INTEGER NOT NULL,
            rule_name       TEXT    NOT NULL,
            warn_level      INTEGER NOT NULL,
            signal_data     TEXT    NOT NULL,
            is_delete       INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT    NOT NULL,
            updated_at      TEXT    NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_warn_rule_battery ON warn_rule (battery_type_id);
        CREATE INDEX IF NOT EXISTS idx_warn_rule_item_rule ON warn_rule_item (rule_id);
        CREATE INDEX IF NOT EXISTS idx_signal_car_created ON signal (car_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_warnings_car_created ON warnings (car_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
