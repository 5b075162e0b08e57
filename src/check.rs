//! Configuration checks for rule sets (R-001..R-008) and validation schemas
//! (S-001..S-005).
//!
//! Returns **all** findings, not just the first. Checks never modify the
//! configuration. Runtime evaluation stays fail-closed regardless of what is
//! reported here.

use crate::enums::{ActionKind, FieldFlag, Operator};
use crate::error::{CheckResult, Diagnostic};
use crate::types::{RuleConfig, ValidationSchema};
use std::collections::BTreeMap;

/// Check a rule configuration.
pub fn check_rules(config: &RuleConfig) -> CheckResult {
    let mut result = CheckResult::default();

    for (i, rule) in config.rules.iter().enumerate() {
        let path = format!("rules[{}]", i);

        if rule.conditions.is_empty() {
            result.push(Diagnostic::warning(
                "R-001",
                format!("{}.conditions", path),
                "rule has no conditions and never fires",
            ));
        }

        for (j, cond) in rule.conditions.iter().enumerate() {
            let cond_path = format!("{}.conditions[{}]", path, j);
            r002_to_r004_condition(&cond_path, cond, &mut result);
        }

        r005_targets(&path, rule.action.target.fields(), &mut result);

        match &rule.action.kind {
            ActionKind::Other(name) => result.push(Diagnostic::warning(
                "R-006",
                format!("{}.action.type", path),
                format!("unknown action type '{}'; the action is ignored", name),
            )),
            ActionKind::SetValue if rule.action.value.is_none() => {
                result.push(Diagnostic::warning(
                    "R-007",
                    format!("{}.action.value", path),
                    "set_value without a value suggests nothing",
                ))
            }
            _ => {}
        }
    }

    r008_conflicting_writes(config, &mut result);
    result
}

fn r002_to_r004_condition(path: &str, cond: &crate::types::Condition, result: &mut CheckResult) {
    if let Operator::Other(name) = &cond.operator {
        result.push(Diagnostic::warning(
            "R-002",
            format!("{}.operator", path),
            format!("unknown operator '{}'; the condition is always false", name),
        ));
        return;
    }

    if cond.operator.uses_values() && cond.values.is_none() {
        result.push(Diagnostic::warning(
            "R-003",
            format!("{}.values", path),
            format!("'{}' without values", cond.operator),
        ));
    }

    if cond.operator.uses_value() && cond.value.is_none() {
        result.push(Diagnostic::warning(
            "R-004",
            format!("{}.value", path),
            format!("'{}' without value compares against an absent value", cond.operator),
        ));
    }
}

fn r005_targets(path: &str, targets: &[String], result: &mut CheckResult) {
    if targets.is_empty() {
        result.push(Diagnostic::error(
            "R-005",
            format!("{}.action.target", path),
            "action must target at least one field",
        ));
    }
    for (k, target) in targets.iter().enumerate() {
        if target.trim().is_empty() {
            result.push(Diagnostic::error(
                "R-005",
                format!("{}.action.target[{}]", path, k),
                "target field name must not be empty",
            ));
        }
    }
}

/// Flags attributes that different rules drive in opposite directions. Both
/// rules may fire together, and then the later one wins.
fn r008_conflicting_writes(config: &RuleConfig, result: &mut CheckResult) {
    let mut writers: BTreeMap<(&str, FieldFlag), Vec<(usize, bool)>> = BTreeMap::new();

    for (i, rule) in config.rules.iter().enumerate() {
        let Some((flag, on)) = rule.action.kind.flag_effect() else {
            continue;
        };
        for target in rule.action.target.fields() {
            writers
                .entry((target.as_str(), flag))
                .or_default()
                .push((i, on));
        }
    }

    for ((field, flag), writes) in writers {
        let Some(&(first, first_on)) = writes.first() else {
            continue;
        };
        if let Some(&(other, _)) = writes.iter().find(|(_, on)| *on != first_on) {
            result.push(Diagnostic::warning(
                "R-008",
                format!("rules[{}].action", other),
                format!(
                    "rules[{}] and rules[{}] set '{}' of '{}' in opposite directions; when both fire the later rule wins",
                    first, other, flag, field
                ),
            ));
        }
    }
}

/// Check a validation schema.
pub fn check_schema(schema: &ValidationSchema) -> CheckResult {
    let mut result = CheckResult::default();

    for (field, rule) in &schema.fields {
        for dep in &rule.depends_on {
            if dep == field {
                result.push(Diagnostic::warning(
                    "S-002",
                    format!("{}.dependsOn", field),
                    "field depends on itself",
                ));
            } else if schema.get(dep).is_none() {
                result.push(Diagnostic::warning(
                    "S-001",
                    format!("{}.dependsOn", field),
                    format!("'{}' is not a field of this schema", dep),
                ));
            }
        }

        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length)
            && min > max
        {
            result.push(Diagnostic::error(
                "S-003",
                format!("{}.minLength", field),
                format!("minLength {} exceeds maxLength {}", min, max),
            ));
        }

        if let (Some(min), Some(max)) = (rule.min, rule.max)
            && min > max
        {
            result.push(Diagnostic::error(
                "S-004",
                format!("{}.min", field),
                format!("min {} exceeds max {}", min, max),
            ));
        }

        if let Some(expr) = &rule.expr {
            s005_expression(field, expr, &mut result);
        }
    }

    result
}

#[cfg(feature = "cel-eval")]
fn s005_expression(field: &str, expr: &str, result: &mut CheckResult) {
    use crate::custom::{CelExpressionEvaluator, ExpressionEvaluator};

    if let Err(e) = CelExpressionEvaluator.compile(expr) {
        result.push(Diagnostic::error(
            "S-005",
            format!("{}.expr", field),
            e.message,
        ));
    }
}

#[cfg(not(feature = "cel-eval"))]
fn s005_expression(field: &str, _expr: &str, result: &mut CheckResult) {
    result.push(Diagnostic::warning(
        "S-005",
        format!("{}.expr", field),
        "expression checks need the `cel-eval` feature; the expression is ignored",
    ));
}
