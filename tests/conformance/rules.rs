use super::common::load_cases;
use formlogic::rules::evaluate_rules;
use formlogic::types::{FieldState, FormData, Rule, RuleConfig};
use std::collections::BTreeMap;

#[derive(Debug, serde::Deserialize)]
struct RuleCase {
    id: String,
    name: String,
    rules: Vec<Rule>,
    data: FormData,
    expected: BTreeMap<String, FieldState>,
}

#[test]
fn rule_suite() {
    let cases: Vec<RuleCase> = load_cases("rules.yaml");
    assert!(!cases.is_empty(), "rule suite is empty");

    let mut failed = Vec::new();
    for case in &cases {
        let config = RuleConfig::new(case.rules.clone());
        let states = evaluate_rules(&config, &case.data);

        for (field, expected) in &case.expected {
            let actual = states.get(field);
            if actual != Some(expected) {
                eprintln!(
                    "  FAIL [{}] {} / {}: expected {:?}, got {:?}",
                    case.id, case.name, field, expected, actual
                );
                failed.push(format!("{}:{}", case.id, field));
            }
        }
    }

    assert!(failed.is_empty(), "failing cases: {:?}", failed);
}
