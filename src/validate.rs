//! Field validation against a [`ValidationSchema`].
//!
//! Checks for one field run in a fixed order and stop at the first failure:
//!
//! ```text
//! empty? → required → string (minLength, maxLength, pattern)
//!                   → number (min, max) → custom
//! ```

use crate::primitives::is_empty_value;
use crate::types::{
    FieldResult, FieldRule, FormData, ValidationOptions, ValidationSchema, ValidationState,
};
use serde_json::Value;

const DEFAULT_PATTERN_MESSAGE: &str = "Invalid format";

fn required_message(field: &str, rule: &FieldRule) -> String {
    rule.message
        .clone()
        .unwrap_or_else(|| format!("{} is required", field))
}

/// Validates one field of `data` against its rule.
pub fn validate_field(
    field: &str,
    rule: &FieldRule,
    data: &FormData,
    options: &ValidationOptions,
) -> FieldResult {
    let value = data.get(field);

    if is_empty_value(value) {
        if rule.required {
            return FieldResult::error(required_message(field, rule));
        }
        if options.skip_empty {
            return FieldResult::ok();
        }
    }

    let value = value.unwrap_or(&Value::Null);
    let error = match value {
        Value::String(text) => check_string(text, rule),
        Value::Number(n) => n.as_f64().and_then(|n| check_number(n, rule)),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };

    let error = error.or_else(|| rule.custom.as_ref().and_then(|c| c.run(field, value, data)));

    match error {
        Some(message) => FieldResult::error(message),
        None => FieldResult::ok(),
    }
}

fn check_string(text: &str, rule: &FieldRule) -> Option<String> {
    let length = text.chars().count();

    if let Some(min) = rule.min_length
        && length < min
    {
        return Some(
            rule.message
                .clone()
                .unwrap_or_else(|| format!("Must be at least {} characters", min)),
        );
    }

    if let Some(max) = rule.max_length
        && length > max
    {
        return Some(
            rule.message
                .clone()
                .unwrap_or_else(|| format!("Must be no more than {} characters", max)),
        );
    }

    if let Some(pattern) = &rule.pattern
        && !pattern.is_match(text)
    {
        return Some(
            rule.message
                .clone()
                .unwrap_or_else(|| DEFAULT_PATTERN_MESSAGE.to_string()),
        );
    }

    None
}

fn check_number(n: f64, rule: &FieldRule) -> Option<String> {
    if let Some(min) = rule.min
        && n < min
    {
        return Some(format!("Must be at least {}", min));
    }

    if let Some(max) = rule.max
        && n > max
    {
        return Some(format!("Must be no more than {}", max));
    }

    None
}

/// Validates every schema field and returns the aggregate state.
pub fn validate_all(
    schema: &ValidationSchema,
    data: &FormData,
    options: &ValidationOptions,
) -> ValidationState {
    let mut state = ValidationState::default();

    for (field, rule) in &schema.fields {
        let result = validate_field(field, rule, data, options);
        state.field_validation.insert(field.clone(), result.is_valid());
        if let Some(error) = result.error {
            state.errors.insert(field.clone(), error);
        }
        if let Some(warning) = result.warning {
            state.warnings.insert(field.clone(), warning);
        }
    }

    state.is_valid = state.errors.is_empty();
    state
}
