//! YAML → rule configuration and validation schema.
//!
//! Performs YAML deserialization and type mapping only. Configuration checks
//! live in [`crate::check`].

use crate::error::{ParseError, ParseErrorKind};
use crate::types::{RuleConfig, ValidationSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a YAML rule configuration (`rules: [...]`).
pub fn parse_rules(input: &str) -> Result<RuleConfig, ParseError> {
    let value = parse_mapping(input)?;
    typed(value)
}

/// Parse a YAML validation schema (`field: {required: true, ...}`).
///
/// With the `cel-eval` feature, every `expr` is attached as the field's
/// custom check.
pub fn parse_schema(input: &str) -> Result<ValidationSchema, ParseError> {
    let value = parse_mapping(input)?;

    if let Some(obj) = value.as_object() {
        for (field, rule) in obj {
            if !rule.is_object() {
                return Err(ParseError {
                    kind: ParseErrorKind::TypeMismatch,
                    message: format!("rule for field '{}' must be a mapping", field),
                    path: Some(field.clone()),
                });
            }
        }
    }

    #[allow(unused_mut)]
    let mut schema: ValidationSchema = typed(value)?;

    #[cfg(feature = "cel-eval")]
    crate::custom::attach_expressions(&mut schema, &crate::custom::CelExpressionEvaluator);

    Ok(schema)
}

/// Reads YAML into a JSON value whose root is a mapping.
fn parse_mapping(input: &str) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            kind: ParseErrorKind::Syntax,
            message: "empty input".to_string(),
            path: None,
        });
    }

    check_multi_document(input)?;

    let value: Value = serde_saphyr::from_str(input).map_err(|e| {
        let msg = e.to_string();
        ParseError {
            kind: classify_saphyr_error(&msg),
            message: msg,
            path: None,
        }
    })?;

    if !value.is_object() {
        return Err(ParseError {
            kind: ParseErrorKind::TypeMismatch,
            message: "configuration root must be a YAML mapping".to_string(),
            path: None,
        });
    }

    Ok(value)
}

fn typed<T: DeserializeOwned>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| {
        let msg = e.to_string();
        ParseError {
            kind: classify_json_error(&msg),
            message: msg,
            path: None,
        }
    })
}

/// Check for multiple YAML documents (--- separator).
/// Only matches `---` at column 0 to avoid false positives inside block scalars.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let mut doc_count = 0;
    for line in input.lines() {
        if line.starts_with("---") && line[3..].trim().is_empty() {
            doc_count += 1;
            if doc_count > 1 {
                return Err(ParseError {
                    kind: ParseErrorKind::Syntax,
                    message: "multi-document YAML is not supported".to_string(),
                    path: None,
                });
            }
        }
    }
    Ok(())
}

fn classify_saphyr_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown") || lower.contains("variant") {
        ParseErrorKind::UnknownVariant
    } else if lower.contains("type") || lower.contains("invalid") || lower.contains("expected") {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}

fn classify_json_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown variant") || lower.contains("unknown field") {
        ParseErrorKind::UnknownVariant
    } else if lower.contains("missing field")
        || lower.contains("invalid type")
        || lower.contains("invalid pattern")
        || lower.contains("did not match any variant")
    {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}
