//! Warning rule domain model
//!
//! A rule owns an ordered list of non-overlapping severity buckets over a
//! derived metric. Conditions have no existence outside their owning rule;
//! they carry no back-reference.

use crate::error::{ModelError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derived-metric vocabulary, closed in this version
///
/// Adding a new expression means extending this enum; the engine matches on
/// it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarnExpr {
    /// Voltage difference: Mx - Mi
    #[serde(rename = "MX_MI")]
    VoltageDiff,
    /// Current difference: Ix - Ii
    #[serde(rename = "IX_II")]
    CurrentDiff,
}

impl WarnExpr {
    pub const fn as_str(&self) -> &'static str {
        match self {
            WarnExpr::VoltageDiff => "MX_MI",
            WarnExpr::CurrentDiff => "IX_II",
        }
    }
}

impl FromStr for WarnExpr {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MX_MI" => Ok(WarnExpr::VoltageDiff),
            "IX_II" => Ok(WarnExpr::CurrentDiff),
            other => Err(ModelError::UnsupportedExpression(other.to_string())),
        }
    }
}

impl fmt::Display for WarnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One severity bucket: half-open interval `[min_val, max_val)`
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub min_val: Option<Decimal>,
    pub max_val: Option<Decimal>,
    pub warn_level: i32,
}

impl RuleCondition {
    pub fn new(min_val: Option<Decimal>, max_val: Option<Decimal>, warn_level: i32) -> Self {
        Self {
            min_val,
            max_val,
            warn_level,
        }
    }

    /// Lower bound inclusive, upper bound exclusive
    pub fn contains(&self, value: Decimal) -> bool {
        if let Some(min) = self.min_val {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max_val {
            if value >= max {
                return false;
            }
        }
        true
    }

    /// Interval intersection check; any unbounded side is treated as disjoint
    pub fn overlaps_with(&self, other: &RuleCondition) -> bool {
        let (Some(min), Some(max), Some(other_min), Some(other_max)) =
            (self.min_val, self.max_val, other.min_val, other.max_val)
        else {
            return false;
        };

        !(max <= other_min || min >= other_max)
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min_val {
            Some(min) => write!(f, "[{}, ", min)?,
            None => write!(f, "(-inf, ")?,
        }
        match self.max_val {
            Some(max) => write!(f, "{})", max)?,
            None => write!(f, "+inf)")?,
        }
        write!(f, " -> level {}", self.warn_level)
    }
}

/// A named evaluation unit scoped to one battery type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarnRule {
    pub rule_id: i64,
    pub rule_no: i32,
    pub name: String,
    /// Raw expression string; parsed into [`WarnExpr`] at evaluation time so
    /// an unknown value is a per-rule error rather than a load failure
    pub expr: String,
    pub battery_type_id: i32,
    conditions: Vec<RuleCondition>,
}

impl WarnRule {
    pub fn create(rule_no: i32, name: &str, expr: &str, battery_type_id: i32) -> Self {
        Self {
            rule_id: 0,
            rule_no,
            name: name.to_string(),
            expr: expr.to_string(),
            battery_type_id,
            conditions: Vec::new(),
        }
    }

    /// Restore a rule from storage with its already-validated conditions
    pub fn restore(
        rule_id: i64,
        rule_no: i32,
        name: String,
        expr: String,
        battery_type_id: i32,
        conditions: Vec<RuleCondition>,
    ) -> Self {
        Self {
            rule_id,
            rule_no,
            name,
            expr,
            battery_type_id,
            conditions,
        }
    }

    /// Append a condition, rejecting intervals that intersect an existing one.
    ///
    /// On rejection the condition set is left unchanged.
    pub fn add_condition(&mut self, condition: RuleCondition) -> Result<()> {
        for existing in &self.conditions {
            if existing.overlaps_with(&condition) {
                return Err(ModelError::OverlappingCondition {
                    new: condition.to_string(),
                    existing: existing.to_string(),
                });
            }
        }
        self.conditions.push(condition);
        Ok(())
    }

    /// Conditions in insertion order
    pub fn conditions(&self) -> &[RuleCondition] {
        &self.conditions
    }

    /// Parse the expression string into the closed vocabulary
    pub fn expression(&self) -> Result<WarnExpr> {
        self.expr.parse()
    }
}
