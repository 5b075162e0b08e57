use formlogic::enums::{ActionKind, Operator};
use formlogic::rules::evaluate_rules;
use formlogic::types::{Action, Condition, FormData, Rule, RuleConfig};
use proptest::prelude::*;
use serde_json::json;

fn flag_rule(trigger: usize, kind: ActionKind, target: usize) -> Rule {
    Rule::new(
        vec![Condition::new(format!("t{}", trigger), Operator::Equals).with_value(true)],
        Action::new(kind, format!("field{}", target).as_str()),
    )
}

fn action_kind() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        Just(ActionKind::Show),
        Just(ActionKind::Hide),
        Just(ActionKind::Enable),
        Just(ActionKind::Disable),
        Just(ActionKind::Require),
        Just(ActionKind::Optional),
        Just(ActionKind::ClearValue),
    ]
}

fn rule_set() -> impl Strategy<Value = Vec<(usize, ActionKind, usize)>> {
    prop::collection::vec((0usize..4, action_kind(), 0usize..3), 0..10)
}

fn triggers() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 4)
}

fn build(rules: &[(usize, ActionKind, usize)], flags: &[bool]) -> (RuleConfig, FormData) {
    let config = RuleConfig::new(
        rules
            .iter()
            .map(|(t, kind, target)| flag_rule(*t, kind.clone(), *target))
            .collect(),
    );
    let mut data = FormData::new();
    for (i, flag) in flags.iter().enumerate() {
        data.insert(format!("t{}", i), json!(flag));
    }
    (config, data)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Evaluating twice yields identical states
    #[test]
    fn evaluation_is_idempotent(rules in rule_set(), flags in triggers()) {
        let (config, data) = build(&rules, &flags);
        prop_assert_eq!(evaluate_rules(&config, &data), evaluate_rules(&config, &data));
    }

    // The key set depends only on the configuration, not on which rules fire
    #[test]
    fn key_set_is_stable(rules in rule_set(), a in triggers(), b in triggers()) {
        let (config, data_a) = build(&rules, &a);
        let (_, data_b) = build(&rules, &b);
        let keys_a: Vec<String> = evaluate_rules(&config, &data_a)
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        let keys_b: Vec<String> = evaluate_rules(&config, &data_b)
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        prop_assert_eq!(keys_a, keys_b);
    }

    // Each field's visibility equals the last firing show/hide for it
    #[test]
    fn last_firing_rule_decides_visibility(rules in rule_set(), flags in triggers()) {
        let (config, data) = build(&rules, &flags);
        let states = evaluate_rules(&config, &data);

        for target in 0..3 {
            let field = format!("field{}", target);
            let expected = rules
                .iter()
                .filter(|(t, _, tg)| *tg == target && flags[*t])
                .filter_map(|(_, kind, _)| match kind {
                    ActionKind::Show => Some(true),
                    ActionKind::Hide => Some(false),
                    _ => None,
                })
                .next_back()
                .unwrap_or(true);
            prop_assert_eq!(states.is_field_visible(&field), expected, "field {}", field);
        }
    }

    // Bulk accessors agree with the per-field queries
    #[test]
    fn bulk_accessors_agree(rules in rule_set(), flags in triggers()) {
        let (config, data) = build(&rules, &flags);
        let states = evaluate_rules(&config, &data);
        for (name, _) in states.iter() {
            prop_assert_eq!(states.hidden_fields().contains(&name), !states.is_field_visible(name));
            prop_assert_eq!(
                states.disabled_fields().contains(&name),
                !states.is_field_enabled(name)
            );
            prop_assert_eq!(
                states.required_fields().contains(&name),
                states.is_field_required(name)
            );
            prop_assert_eq!(
                states.fields_to_clear().contains(&name),
                states.should_clear_field(name)
            );
        }
    }
}
