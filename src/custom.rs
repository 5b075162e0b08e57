//! Custom field predicates and their expression-based form.
//!
//! A [`CustomCheck`] is the last step of field validation. It returns an
//! error message or `None`. A check that panics does not take the form down:
//! the panic is caught and reported as [`CUSTOM_FAILURE_MESSAGE`].
//!
//! Schemas loaded from YAML cannot carry closures, so a field rule may carry an
//! `expr` instead. [`attach_expressions`] turns every such expression into a
//! `CustomCheck` backed by an [`ExpressionEvaluator`]. With the `cel-eval`
//! feature (default) the evaluator is [`CelExpressionEvaluator`].

use crate::error::{ExpressionError, ExpressionErrorKind};
use crate::types::{FormData, ValidationSchema};
use serde_json::Value;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Error reported when a custom check cannot produce a verdict.
pub const CUSTOM_FAILURE_MESSAGE: &str = "Validation error";

/// Error reported when an expression evaluates to `false` and the field rule
/// has no `message`.
pub const EXPRESSION_FALSE_MESSAGE: &str = "Invalid value";

type CheckFn = dyn Fn(&Value, &FormData) -> Option<String> + Send + Sync;

/// Shared custom predicate over `(value, form data)`.
///
/// Must be synchronous and must terminate; a check that never returns hangs
/// the validation pass.
#[derive(Clone)]
pub struct CustomCheck(Arc<CheckFn>);

impl CustomCheck {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Option<String> + Send + Sync + 'static,
    {
        CustomCheck(Arc::new(check))
    }

    /// Runs the check, converting a panic into [`CUSTOM_FAILURE_MESSAGE`].
    pub fn run(&self, field: &str, value: &Value, data: &FormData) -> Option<String> {
        match catch_unwind(AssertUnwindSafe(|| (self.0)(value, data))) {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(field, "custom validation check panicked");
                Some(CUSTOM_FAILURE_MESSAGE.to_string())
            }
        }
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCheck(..)")
    }
}

// ─── Expression evaluation ──────────────────────────────────────────────────

/// Extension point for expression-based custom checks.
pub trait ExpressionEvaluator: Send + Sync {
    /// Compiles `expression` once so it can be evaluated on every pass.
    fn compile(&self, expression: &str) -> Result<Arc<dyn CompiledExpression>, ExpressionError>;
}

/// A compiled expression, ready to run against a context.
pub trait CompiledExpression: Send + Sync {
    /// Evaluates against a context object whose keys are the variables
    /// available to the expression.
    fn evaluate(&self, context: &Value) -> Result<Value, ExpressionError>;
}

/// Builds a [`CustomCheck`] from an expression.
///
/// The expression sees `value` (the field's value, `null` when absent) and
/// `data` (the whole snapshot). `true` or `null` passes, `false` fails with
/// `message` or [`EXPRESSION_FALSE_MESSAGE`], a non-empty string is the error
/// itself. References to fields that are not filled in yet pass.
///
/// An expression that does not compile fails every value with
/// [`CUSTOM_FAILURE_MESSAGE`].
pub fn expression_check(
    expression: &str,
    message: Option<&str>,
    evaluator: &dyn ExpressionEvaluator,
) -> CustomCheck {
    let compiled = match evaluator.compile(expression) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::warn!(expression, error = %e, "expression does not compile");
            return CustomCheck::new(|_, _| Some(CUSTOM_FAILURE_MESSAGE.to_string()));
        }
    };
    let expression = expression.to_string();
    let message = message.map(str::to_string);

    CustomCheck::new(move |value, data| {
        let mut context = serde_json::Map::new();
        context.insert("value".to_string(), value.clone());
        context.insert("data".to_string(), Value::Object(data.clone()));

        match compiled.evaluate(&Value::Object(context)) {
            Ok(Value::Bool(true)) | Ok(Value::Null) => None,
            Ok(Value::Bool(false)) => Some(
                message
                    .clone()
                    .unwrap_or_else(|| EXPRESSION_FALSE_MESSAGE.to_string()),
            ),
            Ok(Value::String(text)) if text.is_empty() => None,
            Ok(Value::String(text)) => Some(text),
            Ok(other) => {
                tracing::warn!(
                    %expression,
                    result = %other,
                    "expression returned neither bool nor string"
                );
                Some(CUSTOM_FAILURE_MESSAGE.to_string())
            }
            Err(ExpressionError {
                kind: ExpressionErrorKind::MissingReference,
                ..
            }) => None,
            Err(e) => {
                tracing::warn!(%expression, error = %e, "expression check failed");
                Some(CUSTOM_FAILURE_MESSAGE.to_string())
            }
        }
    })
}

/// Installs an expression-backed check on every field rule that has `expr`
/// and no closure. Returns how many checks were attached.
pub fn attach_expressions(
    schema: &mut ValidationSchema,
    evaluator: &dyn ExpressionEvaluator,
) -> usize {
    let mut attached = 0;
    for rule in schema.fields.values_mut() {
        if rule.custom.is_some() {
            continue;
        }
        if let Some(expr) = &rule.expr {
            rule.custom = Some(expression_check(expr, rule.message.as_deref(), evaluator));
            attached += 1;
        }
    }
    attached
}

// ─── Default CEL evaluator (behind `cel-eval` feature) ──────────────────────

/// Expression evaluator backed by the `cel` crate.
#[cfg(feature = "cel-eval")]
#[derive(Clone, Copy, Debug, Default)]
pub struct CelExpressionEvaluator;

#[cfg(feature = "cel-eval")]
impl ExpressionEvaluator for CelExpressionEvaluator {
    fn compile(&self, expression: &str) -> Result<Arc<dyn CompiledExpression>, ExpressionError> {
        let program = cel::Program::compile(expression).map_err(|e| ExpressionError {
            kind: ExpressionErrorKind::Compile,
            message: format!("CEL compile error: {}", e),
        })?;
        Ok(Arc::new(CelProgram(program)))
    }
}

#[cfg(feature = "cel-eval")]
struct CelProgram(cel::Program);

#[cfg(feature = "cel-eval")]
impl CompiledExpression for CelProgram {
    fn evaluate(&self, context: &Value) -> Result<Value, ExpressionError> {
        let mut cel_ctx = cel::Context::default();
        if let Value::Object(map) = context {
            for (key, value) in map {
                cel_ctx.add_variable_from_value(key.as_str(), json_to_cel(value));
            }
        }

        match self.0.execute(&cel_ctx) {
            Ok(cel::Value::Bool(b)) => Ok(Value::Bool(b)),
            Ok(cel::Value::String(s)) => Ok(Value::String(s.to_string())),
            Ok(cel::Value::Null) => Ok(Value::Null),
            Ok(_) => Err(ExpressionError {
                kind: ExpressionErrorKind::TypeError,
                message: "CEL expression must return a bool, a string or null".to_string(),
            }),
            Err(ref e @ cel::ExecutionError::NoSuchKey(_))
            | Err(ref e @ cel::ExecutionError::UndeclaredReference(_)) => Err(ExpressionError {
                kind: ExpressionErrorKind::MissingReference,
                message: format!("CEL missing reference: {}", e),
            }),
            Err(e) => Err(ExpressionError {
                kind: ExpressionErrorKind::Execution,
                message: format!("CEL execution error: {}", e),
            }),
        }
    }
}

#[cfg(feature = "cel-eval")]
fn json_to_cel(value: &Value) -> cel::Value {
    use std::collections::HashMap;

    match value {
        Value::Null => cel::Value::Null,
        Value::Bool(b) => cel::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                cel::Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                cel::Value::UInt(u)
            } else if let Some(f) = n.as_f64() {
                cel::Value::Float(f)
            } else {
                cel::Value::Null
            }
        }
        Value::String(s) => cel::Value::String(Arc::new(s.clone())),
        Value::Array(items) => cel::Value::List(Arc::new(items.iter().map(json_to_cel).collect())),
        Value::Object(map) => {
            let entries: HashMap<String, cel::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_cel(v)))
                .collect();
            entries.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone)]
    struct Fixed(Result<Value, ExpressionError>);

    impl ExpressionEvaluator for Fixed {
        fn compile(&self, _: &str) -> Result<Arc<dyn CompiledExpression>, ExpressionError> {
            Ok(Arc::new(self.clone()))
        }
    }

    impl CompiledExpression for Fixed {
        fn evaluate(&self, _: &Value) -> Result<Value, ExpressionError> {
            self.0.clone()
        }
    }

    /// Counts compilations; every compiled expression passes.
    #[derive(Default)]
    struct Counting(std::sync::atomic::AtomicUsize);

    impl ExpressionEvaluator for Counting {
        fn compile(&self, _: &str) -> Result<Arc<dyn CompiledExpression>, ExpressionError> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Arc::new(Fixed(Ok(json!(true)))))
        }
    }

    struct Uncompilable;

    impl ExpressionEvaluator for Uncompilable {
        fn compile(&self, _: &str) -> Result<Arc<dyn CompiledExpression>, ExpressionError> {
            Err(ExpressionError {
                kind: ExpressionErrorKind::Compile,
                message: "unexpected end of input".to_string(),
            })
        }
    }

    fn run_fixed(result: Result<Value, ExpressionError>, message: Option<&str>) -> Option<String> {
        let check = expression_check("ignored", message, &Fixed(result));
        check.run("f", &json!(1), &FormData::new())
    }

    #[test]
    fn panicking_check_becomes_generic_error() {
        let check = CustomCheck::new(|_, _| panic!("boom"));
        assert_eq!(
            check.run("f", &Value::Null, &FormData::new()).as_deref(),
            Some(CUSTOM_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn expression_outcomes_map_to_messages() {
        assert_eq!(run_fixed(Ok(json!(true)), None), None);
        assert_eq!(run_fixed(Ok(Value::Null), None), None);
        assert_eq!(
            run_fixed(Ok(json!(false)), None).as_deref(),
            Some(EXPRESSION_FALSE_MESSAGE)
        );
        assert_eq!(
            run_fixed(Ok(json!(false)), Some("too small")).as_deref(),
            Some("too small")
        );
        assert_eq!(run_fixed(Ok(json!("bad")), None).as_deref(), Some("bad"));
        assert_eq!(run_fixed(Ok(json!("")), None), None);
        assert_eq!(
            run_fixed(Ok(json!(3)), None).as_deref(),
            Some(CUSTOM_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn missing_reference_passes_other_errors_fail() {
        let missing = ExpressionError {
            kind: ExpressionErrorKind::MissingReference,
            message: "no such key".to_string(),
        };
        assert_eq!(run_fixed(Err(missing), None), None);

        let broken = ExpressionError {
            kind: ExpressionErrorKind::Execution,
            message: "boom".to_string(),
        };
        assert_eq!(
            run_fixed(Err(broken), None).as_deref(),
            Some(CUSTOM_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn attach_skips_rules_with_closures() {
        use crate::types::FieldRule;

        let mut schema = ValidationSchema::new()
            .field("a", FieldRule::new().expr("value > 1"))
            .field("b", FieldRule::new().expr("value > 1").custom(|_, _| None))
            .field("c", FieldRule::new());
        let attached = attach_expressions(&mut schema, &Fixed(Ok(json!(true))));
        assert_eq!(attached, 1);
        assert!(schema.get("a").unwrap().custom.is_some());
        assert!(schema.get("c").unwrap().custom.is_none());
    }

    #[test]
    fn expression_compiles_once_for_many_runs() {
        let evaluator = Counting::default();
        let check = expression_check("value > 1", None, &evaluator);
        for n in 0..5 {
            assert_eq!(check.run("f", &json!(n), &FormData::new()), None);
        }
        assert_eq!(evaluator.0.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn uncompilable_expression_fails_every_value() {
        let check = expression_check("value >", None, &Uncompilable);
        assert_eq!(
            check.run("f", &json!(2), &FormData::new()).as_deref(),
            Some(CUSTOM_FAILURE_MESSAGE)
        );
    }

    #[cfg(feature = "cel-eval")]
    #[test]
    fn cel_program_is_reused_across_snapshots() {
        let check = expression_check("value <= data.max_rent", None, &CelExpressionEvaluator);
        let mut data = FormData::new();
        data.insert("max_rent".to_string(), json!(2000));
        assert_eq!(check.run("rent", &json!(1500), &data), None);
        assert_eq!(
            check.run("rent", &json!(2500), &data).as_deref(),
            Some(EXPRESSION_FALSE_MESSAGE)
        );
    }
}
