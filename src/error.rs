use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic severity level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A structured finding produced while checking rule or schema configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code} at {}: {message}", .path.as_deref().unwrap_or("<root>"))]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: DiagnosticSeverity::Error,
            code: code.to_string(),
            path: Some(path.into()),
            message: message.into(),
        }
    }

    pub fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: DiagnosticSeverity::Warning,
            code: code.to_string(),
            path: Some(path.into()),
            message: message.into(),
        }
    }
}

/// Result of a configuration check: every error and warning found.
#[derive(Clone, Debug, Default)]
pub struct CheckResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            DiagnosticSeverity::Error => self.errors.push(diagnostic),
            DiagnosticSeverity::Warning => self.warnings.push(diagnostic),
        }
    }
}

/// Error kind for parse failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownVariant,
}

/// Produced by `parse_rules` / `parse_schema` when YAML cannot be read into
/// configuration. Displays as `path: message` when the path is known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}{message}", .path.as_deref().map(|p| format!("{}: ", p)).unwrap_or_default())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Serialization error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SerializeError {
    pub message: String,
}

/// A form-data snapshot that is not a flat mapping.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormDataError {
    #[error("form data must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// Failures of the injected key-value store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode entry '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode entry '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Combined error type for the `load_rules` / `load_schema` entry points.
#[derive(Clone, Debug, Error)]
pub enum FormLogicError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Configuration error: {0}")]
    Config(Diagnostic),
}

/// Error kind for custom expression failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionErrorKind {
    Compile,
    MissingReference,
    Execution,
    TypeError,
}

/// Produced by an [`ExpressionEvaluator`](crate::custom::ExpressionEvaluator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ExpressionError {
    pub kind: ExpressionErrorKind,
    pub message: String,
}
