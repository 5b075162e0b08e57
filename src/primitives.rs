//! Condition and rule evaluation.
//!
//! Everything here is pure and fail-closed: a condition that cannot be
//! evaluated (unknown operator, mismatched types, missing operand) is `false`,
//! never a panic.

use crate::enums::{Logic, Operator};
use crate::error::FormDataError;
use crate::types::{Condition, FormData, Rule};
use serde_json::Value;
use std::borrow::Cow;

// ─── Form data ──────────────────────────────────────────────────────────────

/// Accepts a snapshot only when it is a JSON object.
pub fn form_data(value: Value) -> Result<FormData, FormDataError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(FormDataError::NotAnObject("null")),
        Value::Bool(_) => Err(FormDataError::NotAnObject("boolean")),
        Value::Number(_) => Err(FormDataError::NotAnObject("number")),
        Value::String(_) => Err(FormDataError::NotAnObject("string")),
        Value::Array(_) => Err(FormDataError::NotAnObject("array")),
    }
}

/// Missing, `null` and `""` count as empty. Empty arrays and objects do not.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

// ─── Equality ───────────────────────────────────────────────────────────────

/// Strict equality between two possibly-absent values.
///
/// Absent equals only absent; absent never equals `null`. Integer 42 equals
/// float 42.0. Arrays and objects compare structurally.
pub fn values_strict_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => values_deep_equal(a, b),
        _ => false,
    }
}

fn values_deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => a == b,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| values_deep_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|bv| values_deep_equal(v, bv)))
        }
        _ => false,
    }
}

// ─── Condition evaluator ────────────────────────────────────────────────────

/// Evaluates one condition against the snapshot.
pub fn evaluate_condition(condition: &Condition, data: &FormData) -> bool {
    let actual = data.get(&condition.field);
    let expected = condition.value.as_ref();

    match &condition.operator {
        Operator::Equals => values_strict_equal(actual, expected),
        Operator::NotEquals => !values_strict_equal(actual, expected),
        Operator::GreaterThan => compare_numbers(actual, expected, |a, b| a > b),
        Operator::LessThan => compare_numbers(actual, expected, |a, b| a < b),
        Operator::Contains => match (actual, expected.and_then(operand_text)) {
            (Some(Value::String(text)), Some(needle)) => text.contains(&*needle),
            _ => false,
        },
        Operator::NotContains => match (actual, expected.and_then(operand_text)) {
            (Some(Value::String(text)), Some(needle)) => !text.contains(&*needle),
            _ => false,
        },
        Operator::In => match &condition.values {
            Some(values) => values.iter().any(|v| values_strict_equal(actual, Some(v))),
            None => false,
        },
        Operator::NotIn => match &condition.values {
            Some(values) => !values.iter().any(|v| values_strict_equal(actual, Some(v))),
            None => true,
        },
        Operator::Exists => !is_empty_value(actual),
        Operator::NotExists => is_empty_value(actual),
        Operator::Other(_) => false,
    }
}

/// Orders a numeric field value against the operand. The field must hold a
/// number; the operand may be a number or a string that parses as one.
fn compare_numbers(
    actual: Option<&Value>,
    expected: Option<&Value>,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    let Some(Value::Number(a)) = actual else {
        return false;
    };
    match (a.as_f64(), expected.and_then(operand_number)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn operand_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Text a scalar operand is searched for in a string field.
fn operand_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null => Some(Cow::Borrowed("null")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

// ─── Rule evaluator ─────────────────────────────────────────────────────────

/// Returns whether `rule` fires for the snapshot. A rule without conditions
/// never fires.
pub fn evaluate_rule(rule: &Rule, data: &FormData) -> bool {
    if rule.conditions.is_empty() {
        return false;
    }

    match rule.logic {
        Logic::And => rule.conditions.iter().all(|c| evaluate_condition(c, data)),
        Logic::Or => rule.conditions.iter().any(|c| evaluate_condition(c, data)),
    }
}
