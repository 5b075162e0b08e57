use formlogic::types::{FieldRule, FormData, ValidationOptions, ValidationSchema};
use formlogic::validate::{validate_all, validate_field};
use proptest::prelude::*;
use serde_json::{Value, json};

fn snapshot(field: &str, value: Value) -> FormData {
    let mut data = FormData::new();
    data.insert(field.to_string(), value);
    data
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // A length window accepts exactly the strings whose char count is inside it
    #[test]
    fn length_window(text in "\\PC{0,20}", min in 0usize..8, span in 0usize..8) {
        let max = min + span;
        let rule = FieldRule::new().min_length(min).max_length(max);
        let data = snapshot("name", Value::String(text.clone()));
        let result = validate_field("name", &rule, &data, &ValidationOptions::default());
        let len = text.chars().count();
        let inside = text.is_empty() || (len >= min && len <= max);
        prop_assert_eq!(result.is_valid(), inside);
    }

    // Numeric bounds are inclusive
    #[test]
    fn numeric_bounds_inclusive(n in -500i64..500, lo in -100i64..0, hi in 0i64..100) {
        let rule = FieldRule::new().min(lo as f64).max(hi as f64);
        let data = snapshot("rent", json!(n));
        let result = validate_field("rent", &rule, &data, &ValidationOptions::default());
        prop_assert_eq!(result.is_valid(), n >= lo && n <= hi);
    }

    // At most one error per field; warnings are never produced
    #[test]
    fn single_error_per_field(text in ".{0,10}") {
        let rule = FieldRule::new()
            .required()
            .min_length(3)
            .max_length(5)
            .custom(|_, _| Some("custom".to_string()));
        let schema = ValidationSchema::new().field("f", rule);
        let state = validate_all(
            &schema,
            &snapshot("f", Value::String(text)),
            &ValidationOptions::default(),
        );
        prop_assert_eq!(state.errors.len(), 1);
        prop_assert!(state.warnings.is_empty());
        prop_assert!(!state.is_valid);
    }

    // is_valid mirrors the error map and field_validation covers every schema field
    #[test]
    fn aggregate_consistency(values in prop::collection::vec(prop::option::of(-20i64..20), 1..6)) {
        let mut schema = ValidationSchema::new();
        let mut data = FormData::new();
        for (i, value) in values.iter().enumerate() {
            let name = format!("f{}", i);
            schema = schema.field(name.clone(), FieldRule::new().required().min(0.0));
            if let Some(v) = value {
                data.insert(name, json!(v));
            }
        }
        let state = validate_all(&schema, &data, &ValidationOptions::default());
        prop_assert_eq!(state.is_valid, state.errors.is_empty());
        prop_assert_eq!(state.field_validation.len(), values.len());
        for (name, ok) in &state.field_validation {
            prop_assert_eq!(*ok, !state.errors.contains_key(name));
        }
    }
}
