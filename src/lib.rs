//! Declarative conditional-field rules and multi-field validation for the
//! HomeWiz operator, building, room, tenant and lead forms.
//!
//! Two pure engines work over a flat snapshot of form values:
//!
//! ```text
//! RuleConfig       + FormData → evaluate_rules → FieldStates      (visible / enabled / required / value / clear)
//! ValidationSchema + FormData → validate_all   → ValidationState  (errors / warnings / is_valid)
//! ```
//!
//! [`session::ValidationEngine`] adds the per-session state on top of
//! validation: touched fields, debounced re-validation and dependency-triggered
//! re-validation. Coupling the two engines (for instance clearing the errors of
//! a field a rule just hid) is left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//!
//! let yaml = r#"
//! rules:
//!   - conditions:
//!       - field: hasVehicle
//!         operator: equals
//!         value: true
//!     action:
//!       type: show
//!       target: licensePlate
//!   - conditions:
//!       - field: hasVehicle
//!         operator: not_equals
//!         value: true
//!     action:
//!       type: hide
//!       target: licensePlate
//! "#;
//!
//! let loaded = formlogic::load_rules(yaml).expect("valid rules");
//! let data = formlogic::form_data(json!({ "hasVehicle": true })).unwrap();
//! let states = formlogic::evaluate_rules(&loaded.config, &data);
//! assert!(states.is_field_visible("licensePlate"));
//! ```
//!
//! # Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cel-eval` | yes     | CEL expressions as custom field checks via the [`cel`] crate. Enables [`custom::CelExpressionEvaluator`]. |

pub mod check;
pub mod custom;
pub mod enums;
pub mod error;
pub mod parse;
pub mod primitives;
pub mod rules;
pub mod serialize;
pub mod session;
pub mod store;
pub mod types;
pub mod validate;

pub use error::*;
pub use types::*;

// Re-export entry-point functions at the crate root for convenience.
pub use check::{check_rules, check_schema};
pub use parse::{parse_rules, parse_schema};
pub use primitives::{evaluate_condition, evaluate_rule, form_data};
pub use rules::{FieldStates, RuleEngine, evaluate_rules};
pub use serialize::serialize_rules;
pub use session::ValidationEngine;
pub use validate::{validate_all, validate_field};

/// Result of the [`load_rules`] convenience entry point.
pub struct LoadedRules {
    pub config: RuleConfig,
    /// Non-fatal findings from [`check_rules`].
    pub warnings: Vec<Diagnostic>,
}

/// Result of the [`load_schema`] convenience entry point.
pub struct LoadedSchema {
    pub schema: ValidationSchema,
    /// Non-fatal findings from [`check_schema`].
    pub warnings: Vec<Diagnostic>,
}

/// Convenience entry point composing parse → check for a rule configuration.
///
/// # Errors
///
/// Returns every error if parsing fails or the check finds errors.
pub fn load_rules(input: &str) -> Result<LoadedRules, Vec<FormLogicError>> {
    let config = parse::parse_rules(input).map_err(|e| vec![FormLogicError::Parse(e)])?;

    let result = check::check_rules(&config);
    if !result.errors.is_empty() {
        return Err(result
            .errors
            .into_iter()
            .map(FormLogicError::Config)
            .collect());
    }

    Ok(LoadedRules {
        config,
        warnings: result.warnings,
    })
}

/// Convenience entry point composing parse → check for a validation schema.
///
/// # Errors
///
/// Returns every error if parsing fails or the check finds errors.
pub fn load_schema(input: &str) -> Result<LoadedSchema, Vec<FormLogicError>> {
    let schema = parse::parse_schema(input).map_err(|e| vec![FormLogicError::Parse(e)])?;

    let result = check::check_schema(&schema);
    if !result.errors.is_empty() {
        return Err(result
            .errors
            .into_iter()
            .map(FormLogicError::Config)
            .collect());
    }

    Ok(LoadedSchema {
        schema,
        warnings: result.warnings,
    })
}
