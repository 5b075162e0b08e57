use super::common::load_cases;
use formlogic::primitives::evaluate_condition;
use formlogic::types::{Condition, FormData};

#[derive(Debug, serde::Deserialize)]
struct ConditionCase {
    id: String,
    name: String,
    condition: Condition,
    data: FormData,
    expected: bool,
}

#[test]
fn condition_suite() {
    let cases: Vec<ConditionCase> = load_cases("conditions.yaml");
    assert!(!cases.is_empty(), "condition suite is empty");

    let mut failed = Vec::new();
    for case in &cases {
        let result = evaluate_condition(&case.condition, &case.data);
        if result != case.expected {
            eprintln!(
                "  FAIL [{}] {}: expected {}, got {}",
                case.id, case.name, case.expected, result
            );
            failed.push(case.id.clone());
        }
    }

    eprintln!(
        "\nconditions: {} passed, {} failed out of {} total",
        cases.len() - failed.len(),
        failed.len(),
        cases.len()
    );
    assert!(failed.is_empty(), "failing cases: {:?}", failed);
}

#[test]
fn condition_suite_is_idempotent() {
    let cases: Vec<ConditionCase> = load_cases("conditions.yaml");
    for case in &cases {
        assert_eq!(
            evaluate_condition(&case.condition, &case.data),
            evaluate_condition(&case.condition, &case.data),
            "[{}] evaluation must not depend on call history",
            case.id
        );
    }
}
