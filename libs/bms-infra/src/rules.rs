//! Warning rule store
//!
//! The non-overlap invariant is enforced through the domain aggregate before
//! anything touches the database: conditions are added to the in-memory rule
//! first, and only a fully valid rule is written.

use crate::error::{Result, StoreError};
use bms_model::{RuleCondition, WarnRule};
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct RuleStore {
    pool: SqlitePool,
}

impl RuleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and persist a rule with its ordered conditions
    pub async fn create_rule(
        &self,
        rule_no: i32,
        name: &str,
        expr: &str,
        battery_type_id: i32,
        conditions: Vec<RuleCondition>,
    ) -> Result<WarnRule> {
        let mut rule = WarnRule::create(rule_no, name, expr, battery_type_id);
        for condition in conditions {
            rule.add_condition(condition)?;
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO warn_rule (rule_no, name, expr, battery_type_id, is_delete,
                                   created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(rule_no)
        .bind(name)
        .bind(expr)
        .bind(battery_type_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let rule_id = result.last_insert_rowid();

        for condition in rule.conditions() {
            sqlx::query(
                r#"
                INSERT INTO warn_rule_item (rule_id, min_val, max_val, warn_level, is_delete,
                                            created_at, updated_at)
                VALUES (?, ?, ?, ?, 0, ?, ?)
                "#,
            )
            .bind(rule_id)
            .bind(condition.min_val.map(|d| d.to_string()))
            .bind(condition.max_val.map(|d| d.to_string()))
            .bind(condition.warn_level)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(WarnRule::restore(
            rule_id,
            rule_no,
            name.to_string(),
            expr.to_string(),
            battery_type_id,
            rule.conditions().to_vec(),
        ))
    }

    /// The ordered rule set applicable to a battery type, soft-deleted rows
    /// excluded
    pub async fn rules_for_battery_type(&self, battery_type_id: i32) -> Result<Vec<WarnRule>> {
        let rows = sqlx::query(
            r#"
            SELECT rule_id, rule_no, name, expr, battery_type_id
            FROM warn_rule
            WHERE battery_type_id = ? AND is_delete = 0
            ORDER BY rule_id ASC
            "#,
        )
        .bind(battery_type_id)
        .fetch_all(&self.pool)
        .await?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            rules.push(self.hydrate_rule(row).await?);
        }
        Ok(rules)
    }

    /// Soft-delete a rule and its conditions
    pub async fn delete_rule(&self, rule_id: i64) -> Result<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE warn_rule
            SET is_delete = 1, updated_at = ?
            WHERE rule_id = ? AND is_delete = 0
            "#,
        )
        .bind(now)
        .bind(rule_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("WarnRule", rule_id));
        }

        sqlx::query(
            r#"
            UPDATE warn_rule_item
            SET is_delete = 1, updated_at = ?
            WHERE rule_id = ?
            "#,
        )
        .bind(now)
        .bind(rule_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn hydrate_rule(&self, row: SqliteRow) -> Result<WarnRule> {
        let rule_id: i64 = row.try_get("rule_id")?;

        let item_rows = sqlx::query(
            r#"
            SELECT min_val, max_val, warn_level
            FROM warn_rule_item
            WHERE rule_id = ? AND is_delete = 0
            ORDER BY item_id ASC
            "#,
        )
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await?;

        let mut conditions = Vec::with_capacity(item_rows.len());
        for item in item_rows {
            conditions.push(RuleCondition::new(
                parse_bound(item.try_get("min_val")?)?,
                parse_bound(item.try_get("max_val")?)?,
                item.try_get("warn_level")?,
            ));
        }

        Ok(WarnRule::restore(
            rule_id,
            row.try_get("rule_no")?,
            row.try_get("name")?,
            row.try_get("expr")?,
            row.try_get("battery_type_id")?,
            conditions,
        ))
    }
}

fn parse_bound(raw: Option<String>) -> Result<Option<Decimal>> {
    raw.map(|s| {
        Decimal::from_str(&s).map_err(|e| StoreError::Corrupt(format!("bound {:?}: {}", s, e)))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite;
    use bms_model::ModelError;

    async fn store() -> RuleStore {
        let pool = sqlite::connect_in_memory().await.unwrap();
        sqlite::init_schema(&pool).await.unwrap();
        RuleStore::new(pool)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bucket_table() -> Vec<RuleCondition> {
        vec![
            RuleCondition::new(Some(dec("5")), None, 0),
            RuleCondition::new(Some(dec("3")), Some(dec("5")), 1),
            RuleCondition::new(Some(dec("1")), Some(dec("3")), 2),
            RuleCondition::new(Some(dec("0.6")), Some(dec("1")), 3),
            RuleCondition::new(Some(dec("0.2")), Some(dec("0.6")), 4),
        ]
    }

    #[tokio::test]
    async fn test_create_and_load_rule_preserves_condition_order() {
        let store = store().await;
        let created = store
            .create_rule(1, "voltage spread", "MX_MI", 100, bucket_table())
            .await
            .unwrap();
        assert!(created.rule_id > 0);

        let rules = store.rules_for_battery_type(100).await.unwrap();
        assert_eq!(rules.len(), 1);

        let levels: Vec<i32> = rules[0]
            .conditions()
            .iter()
            .map(|c| c.warn_level)
            .collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 4]);
        assert_eq!(rules[0].conditions()[4].min_val, Some(dec("0.2")));
    }

    #[tokio::test]
    async fn test_overlapping_conditions_reject_whole_rule() {
        let store = store().await;
        let err = store
            .create_rule(
                1,
                "broken",
                "MX_MI",
                100,
                vec![
                    RuleCondition::new(Some(dec("1")), Some(dec("3")), 2),
                    RuleCondition::new(Some(dec("2")), Some(dec("4")), 1),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Model(ModelError::OverlappingCondition { .. })
        ));

        // Nothing was written
        assert!(store.rules_for_battery_type(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_rules_are_filtered() {
        let store = store().await;
        let rule = store
            .create_rule(1, "voltage spread", "MX_MI", 100, bucket_table())
            .await
            .unwrap();

        store.delete_rule(rule.rule_id).await.unwrap();
        assert!(store.rules_for_battery_type(100).await.unwrap().is_empty());

        let err = store.delete_rule(rule.rule_id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rules_scoped_to_battery_type() {
        let store = store().await;
        store
            .create_rule(1, "voltage spread", "MX_MI", 100, bucket_table())
            .await
            .unwrap();
        store
            .create_rule(2, "current spread", "IX_II", 200, vec![])
            .await
            .unwrap();

        let rules = store.rules_for_battery_type(100).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].expr, "MX_MI");
    }
}
