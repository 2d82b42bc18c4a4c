//! Threshold rule evaluation
//!
//! Pure functions from (rule, parsed signal values) to an optional severity
//! level. All arithmetic is exact decimal; the derived difference is rounded
//! to two decimal places, half-up, before bucket lookup.

use crate::error::Result;
use bms_model::{SignalValues, WarnExpr, WarnRule};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Compute the derived metric for an expression.
///
/// Returns None when a required field is absent from the signal.
pub fn compute_difference(expr: WarnExpr, values: &SignalValues) -> Option<Decimal> {
    let diff = match expr {
        WarnExpr::VoltageDiff => values.voltage_diff()?,
        WarnExpr::CurrentDiff => values.current_diff()?,
    };

    let mut rounded = diff.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    Some(rounded)
}

/// Evaluate one rule against parsed signal values.
///
/// Conditions are scanned in insertion order; the non-overlap invariant
/// guarantees at most one can contain the value, so the order only matters
/// if that invariant has been violated upstream.
pub fn evaluate(rule: &WarnRule, values: &SignalValues) -> Result<Option<i32>> {
    let expr = rule.expression()?;

    let Some(value) = compute_difference(expr, values) else {
        debug!(
            "Rule {} ({}): required fields absent, no match",
            rule.rule_no, rule.name
        );
        return Ok(None);
    };

    Ok(rule
        .conditions()
        .iter()
        .find(|condition| condition.contains(value))
        .map(|condition| condition.warn_level))
}

/// Evaluate every rule in the set, returning `rule_id -> severity` for each
/// match.
///
/// A rule with an unsupported expression is logged and skipped; it never
/// aborts the rest of the batch.
pub fn evaluate_batch(rules: &[WarnRule], values: &SignalValues) -> HashMap<i64, i32> {
    let mut matches = HashMap::new();

    for rule in rules {
        match evaluate(rule, values) {
            Ok(Some(level)) => {
                matches.insert(rule.rule_id, level);
            },
            Ok(None) => {},
            Err(e) => {
                warn!("Skipping rule {} ({}): {}", rule.rule_no, rule.name, e);
            },
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use bms_model::RuleCondition;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn values(payload: &str) -> SignalValues {
        SignalValues::parse(payload).unwrap()
    }

    /// Bucket table used across the evaluation tests:
    /// (5, inf) -> 0, [3, 5) -> 1, [1, 3) -> 2, [0.6, 1) -> 3, [0.2, 0.6) -> 4
    fn voltage_rule() -> WarnRule {
        let mut rule = WarnRule::restore(7, 1, "voltage spread".into(), "MX_MI".into(), 100, vec![]);
        for (min, max, level) in [
            (Some("5"), None, 0),
            (Some("3"), Some("5"), 1),
            (Some("1"), Some("3"), 2),
            (Some("0.6"), Some("1"), 3),
            (Some("0.2"), Some("0.6"), 4),
        ] {
            rule.add_condition(RuleCondition::new(
                min.map(dec),
                max.map(dec),
                level,
            ))
            .unwrap();
        }
        rule
    }

    #[test]
    fn test_rounding_half_up_two_decimals() {
        let rounded = compute_difference(
            WarnExpr::VoltageDiff,
            &values(r#"{"Mx":8.0,"Mi":3.0}"#),
        )
        .unwrap();
        assert_eq!(rounded.to_string(), "5.00");

        let rounded = compute_difference(
            WarnExpr::VoltageDiff,
            &values(r#"{"Mx":8.005,"Mi":3.0}"#),
        )
        .unwrap();
        assert_eq!(rounded.to_string(), "5.01");
    }

    #[test]
    fn test_difference_requires_both_fields() {
        assert_eq!(
            compute_difference(WarnExpr::VoltageDiff, &values(r#"{"Mx":8.0}"#)),
            None
        );
        assert_eq!(
            compute_difference(WarnExpr::CurrentDiff, &values(r#"{"Mx":8.0,"Mi":3.0}"#)),
            None
        );
    }

    #[test]
    fn test_bucket_lookup() {
        let rule = voltage_rule();
        let cases = [
            ("6.0", Some(0)),
            ("4.0", Some(1)),
            ("2.0", Some(2)),
            ("0.8", Some(3)),
            ("0.5", Some(4)),
            ("0.1", None),
        ];
        for (diff, expected) in cases {
            let payload = format!(r#"{{"Mx":{},"Mi":0.0}}"#, diff);
            let result = evaluate(&rule, &values(&payload)).unwrap();
            assert_eq!(result, expected, "difference {}", diff);
        }
    }

    #[test]
    fn test_boundary_values_are_half_open() {
        let rule = voltage_rule();
        // 5.0 falls in [3, 5)? No: upper bound exclusive, so it misses that
        // bucket, and (5, inf) has an inclusive lower bound of 5.
        let result = evaluate(&rule, &values(r#"{"Mx":5.0,"Mi":0.0}"#)).unwrap();
        assert_eq!(result, Some(0));

        let result = evaluate(&rule, &values(r#"{"Mx":0.2,"Mi":0.0}"#)).unwrap();
        assert_eq!(result, Some(4));
    }

    #[test]
    fn test_unsupported_expression_is_an_error_not_a_crash() {
        let rule = WarnRule::restore(9, 2, "bogus".into(), "XX".into(), 100, vec![]);
        let err = evaluate(&rule, &values(r#"{"Mx":8.0,"Mi":3.0}"#)).unwrap_err();
        assert!(matches!(err, RuleError::UnsupportedExpression(_)));
    }

    #[test]
    fn test_batch_skips_unsupported_and_keeps_going() {
        let broken = WarnRule::restore(9, 2, "bogus".into(), "XX".into(), 100, vec![]);
        let rules = vec![broken, voltage_rule()];

        let matches = evaluate_batch(&rules, &values(r#"{"Mx":12.0,"Mi":0.6}"#));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches.get(&7), Some(&0));
    }

    #[test]
    fn test_batch_maps_every_matching_rule() {
        let mut current_rule =
            WarnRule::restore(8, 3, "current spread".into(), "IX_II".into(), 100, vec![]);
        current_rule
            .add_condition(RuleCondition::new(Some(dec("0")), Some(dec("100")), 1))
            .unwrap();
        let rules = vec![voltage_rule(), current_rule];

        let matches =
            evaluate_batch(&rules, &values(r#"{"Mx":12.0,"Mi":0.6,"Ix":9.0,"Ii":1.0}"#));
        assert_eq!(matches.get(&7), Some(&0));
        assert_eq!(matches.get(&8), Some(&1));
    }
}
