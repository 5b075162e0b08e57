use formlogic::enums::{ActionKind, Logic, Operator};
use formlogic::primitives::{evaluate_condition, evaluate_rule};
use formlogic::types::{Action, Condition, FormData, Rule};
use proptest::prelude::*;
use serde_json::{Value, json};

fn snapshot(field: &str, value: Value) -> FormData {
    let mut data = FormData::new();
    data.insert(field.to_string(), value);
    data
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // contains(needle) == str::contains for string fields
    #[test]
    fn contains_matches_std(value in "[a-zA-Z0-9 ]{0,40}", needle in "[a-zA-Z0-9]{0,6}") {
        let cond = Condition::new("notes", Operator::Contains).with_value(needle.clone());
        let data = snapshot("notes", Value::String(value.clone()));
        prop_assert_eq!(evaluate_condition(&cond, &data), value.contains(&needle));
    }

    // For strings, contains and not_contains are strict complements
    #[test]
    fn contains_not_contains_complementary(value in "[a-c]{0,10}", needle in "[a-c]{0,3}") {
        let data = snapshot("notes", Value::String(value));
        let yes = Condition::new("notes", Operator::Contains).with_value(needle.clone());
        let no = Condition::new("notes", Operator::NotContains).with_value(needle);
        prop_assert_ne!(evaluate_condition(&yes, &data), evaluate_condition(&no, &data));
    }

    // equals and not_equals always disagree
    #[test]
    fn equals_not_equals_complementary(actual in scalar(), expected in scalar()) {
        let data = snapshot("f", actual);
        let eq = Condition::new("f", Operator::Equals).with_value(expected.clone());
        let ne = Condition::new("f", Operator::NotEquals).with_value(expected);
        prop_assert_ne!(evaluate_condition(&eq, &data), evaluate_condition(&ne, &data));
    }

    // exists and not_exists always disagree
    #[test]
    fn exists_not_exists_complementary(actual in scalar()) {
        let data = snapshot("f", actual);
        let yes = Condition::new("f", Operator::Exists);
        let no = Condition::new("f", Operator::NotExists);
        prop_assert_ne!(evaluate_condition(&yes, &data), evaluate_condition(&no, &data));
    }

    // in([x]) == equals(x)
    #[test]
    fn in_single_equals_equality(actual in scalar(), member in scalar()) {
        let data = snapshot("f", actual);
        let within = Condition::new("f", Operator::In).with_values(vec![member.clone()]);
        let eq = Condition::new("f", Operator::Equals).with_value(member);
        prop_assert_eq!(evaluate_condition(&within, &data), evaluate_condition(&eq, &data));
    }

    // With values present, in and not_in always disagree
    #[test]
    fn in_not_in_complementary(
        actual in scalar(),
        members in prop::collection::vec(scalar(), 0..4),
    ) {
        let data = snapshot("f", actual);
        let within = Condition::new("f", Operator::In).with_values(members.clone());
        let outside = Condition::new("f", Operator::NotIn).with_values(members);
        prop_assert_ne!(evaluate_condition(&within, &data), evaluate_condition(&outside, &data));
    }

    // greater_than agrees with f64 comparison
    #[test]
    fn greater_than_matches_f64(a in -1000.0f64..1000.0, b in -1000.0f64..1000.0) {
        let data = snapshot("n", json!(a));
        let cond = Condition::new("n", Operator::GreaterThan).with_value(b);
        prop_assert_eq!(evaluate_condition(&cond, &data), a > b);
    }

    // Numeric operators on strings are false, never a panic
    #[test]
    fn numeric_operator_on_string_is_false(text in ".{0,12}", bound in -100i64..100) {
        let data = snapshot("n", Value::String(text));
        let gt = Condition::new("n", Operator::GreaterThan).with_value(bound);
        let lt = Condition::new("n", Operator::LessThan).with_value(bound);
        prop_assert!(!evaluate_condition(&gt, &data));
        prop_assert!(!evaluate_condition(&lt, &data));
    }

    // Unknown operators are always false
    #[test]
    fn unknown_operator_is_false(name in "[a-z_]{1,12}", actual in scalar(), operand in scalar()) {
        let op = Operator::from(format!("x_{}", name));
        prop_assume!(matches!(op, Operator::Other(_)));
        let cond = Condition::new("f", op).with_value(operand);
        prop_assert!(!evaluate_condition(&cond, &snapshot("f", actual)));
    }

    // AND fires iff all conditions hold, OR iff any holds
    #[test]
    fn and_all_or_any(flags in prop::collection::vec(any::<bool>(), 1..6)) {
        let mut data = FormData::new();
        let mut conditions = Vec::new();
        for (i, flag) in flags.iter().enumerate() {
            let field = format!("f{}", i);
            data.insert(field.clone(), json!(flag));
            conditions.push(Condition::new(field, Operator::Equals).with_value(true));
        }
        let action = Action::new(ActionKind::Show, "target");
        let and_rule = Rule::new(conditions.clone(), action.clone());
        let or_rule = Rule::new(conditions, action).with_logic(Logic::Or);

        prop_assert_eq!(evaluate_rule(&and_rule, &data), flags.iter().all(|f| *f));
        prop_assert_eq!(evaluate_rule(&or_rule, &data), flags.iter().any(|f| *f));
    }
}
