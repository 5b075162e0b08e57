//! Folds a rule set over a form snapshot into per-field state.
//!
//! Every field named anywhere in the configuration, as a condition field or as
//! an action target, is seeded with [`FieldState::default`]. Firing rules are
//! then applied in configured order.
//!
//! Tie-break: when two firing rules write the same attribute of the same
//! field, the rule that comes later in `rules` wins. There is no priority or
//! specificity weighting. Reordering a configuration can change the result.

use crate::enums::ActionKind;
use crate::primitives::evaluate_rule;
use crate::types::{Action, FieldState, FormData, RuleConfig};
use serde_json::Value;
use std::collections::BTreeMap;

/// Derived state of every field referenced by a rule configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldStates {
    states: BTreeMap<String, FieldState>,
}

impl FieldStates {
    pub fn get(&self, field: &str) -> Option<&FieldState> {
        self.states.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.states.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `true` for fields no rule mentions.
    pub fn is_field_visible(&self, field: &str) -> bool {
        self.get(field).is_none_or(|s| s.visible)
    }

    /// `true` for fields no rule mentions.
    pub fn is_field_enabled(&self, field: &str) -> bool {
        self.get(field).is_none_or(|s| s.enabled)
    }

    /// `false` for fields no rule mentions.
    pub fn is_field_required(&self, field: &str) -> bool {
        self.get(field).is_some_and(|s| s.required)
    }

    /// Value suggested by a `set_value` action, if one fired.
    pub fn field_value(&self, field: &str) -> Option<&Value> {
        self.get(field).and_then(|s| s.value.as_ref())
    }

    pub fn should_clear_field(&self, field: &str) -> bool {
        self.get(field).is_some_and(|s| s.should_clear)
    }

    pub fn hidden_fields(&self) -> Vec<&str> {
        self.select(|s| !s.visible)
    }

    pub fn disabled_fields(&self) -> Vec<&str> {
        self.select(|s| !s.enabled)
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.select(|s| s.required)
    }

    pub fn fields_to_clear(&self) -> Vec<&str> {
        self.select(|s| s.should_clear)
    }

    fn select(&self, predicate: impl Fn(&FieldState) -> bool) -> Vec<&str> {
        self.states
            .iter()
            .filter(|(_, s)| predicate(s))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    fn apply(&mut self, action: &Action) {
        for target in action.target.fields() {
            let state = self.states.entry(target.clone()).or_default();
            match &action.kind {
                ActionKind::SetValue => state.value = action.value.clone(),
                ActionKind::ClearValue => state.should_clear = true,
                kind => {
                    if let Some((flag, on)) = kind.flag_effect() {
                        state.set_flag(flag, on);
                    }
                }
            }
        }
    }
}

/// Every field name the configuration mentions, in first-seen order.
pub fn referenced_fields(config: &RuleConfig) -> Vec<&str> {
    let mut seen = Vec::new();
    for rule in &config.rules {
        let names = rule
            .conditions
            .iter()
            .map(|c| c.field.as_str())
            .chain(rule.action.target.fields().iter().map(String::as_str));
        for name in names {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    seen
}

/// Computes the field states for one snapshot. Always a full recomputation.
pub fn evaluate_rules(config: &RuleConfig, data: &FormData) -> FieldStates {
    let mut states = FieldStates {
        states: referenced_fields(config)
            .into_iter()
            .map(|name| (name.to_string(), FieldState::default()))
            .collect(),
    };

    let mut fired = 0usize;
    for (index, rule) in config.rules.iter().enumerate() {
        if !evaluate_rule(rule, data) {
            continue;
        }
        tracing::trace!(
            index,
            id = rule.id.as_deref().unwrap_or(""),
            action = %rule.action.kind,
            "rule fired"
        );
        states.apply(&rule.action);
        fired += 1;
    }

    tracing::debug!(rules = config.rules.len(), fired, fields = states.len(), "evaluated rules");
    states
}

/// Holds a rule configuration and the states for the latest snapshot,
/// recomputing only when the snapshot or the configuration changes.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    config: RuleConfig,
    snapshot: Option<FormData>,
    states: FieldStates,
}

impl RuleEngine {
    pub fn new(config: RuleConfig) -> Self {
        let states = evaluate_rules(&config, &FormData::new());
        RuleEngine {
            config,
            snapshot: None,
            states,
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Replaces the configuration and re-evaluates the last snapshot.
    pub fn set_config(&mut self, config: RuleConfig) {
        self.config = config;
        let data = self.snapshot.clone().unwrap_or_default();
        self.states = evaluate_rules(&self.config, &data);
    }

    /// Evaluates `data` unless it equals the previously evaluated snapshot.
    pub fn update(&mut self, data: &FormData) -> &FieldStates {
        if self.snapshot.as_ref() != Some(data) {
            self.states = evaluate_rules(&self.config, data);
            self.snapshot = Some(data.clone());
        }
        &self.states
    }

    pub fn states(&self) -> &FieldStates {
        &self.states
    }
}
