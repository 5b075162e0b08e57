use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::custom::CustomCheck;
use crate::enums::*;

/// A flat snapshot of form values keyed by field name.
///
/// A key that is absent is distinct from a key holding `null`.
pub type FormData = serde_json::Map<String, Value>;

/// Keeps an explicit `null` distinguishable from an absent key.
/// Used together with `#[serde(default)]`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

// ─── Rule configuration ─────────────────────────────────────────────────────

/// A single test against one field of the form data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator) -> Self {
        Condition {
            field: field.into(),
            operator,
            value: None,
            values: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// One field name or a list of field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    One(String),
    Many(Vec<String>),
}

impl Target {
    pub fn fields(&self) -> &[String] {
        match self {
            Target::One(name) => std::slice::from_ref(name),
            Target::Many(names) => names,
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::One(name.to_string())
    }
}

impl From<Vec<&str>> for Target {
    fn from(names: Vec<&str>) -> Self {
        Target::Many(names.into_iter().map(str::to_string).collect())
    }
}

/// The effect a rule applies to its targets when it fires.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub target: Target,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Action {
    pub fn new(kind: ActionKind, target: impl Into<Target>) -> Self {
        Action {
            kind,
            target: target.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Conditions combined by AND/OR, paired with one action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub logic: Logic,
    pub action: Action,
}

impl Rule {
    pub fn new(conditions: Vec<Condition>, action: Action) -> Self {
        Rule {
            id: None,
            conditions,
            logic: Logic::And,
            action,
        }
    }

    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// The rule set of one form type. Order is significant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleConfig {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleConfig { rules }
    }
}

// ─── Derived field state ────────────────────────────────────────────────────

/// Visibility, enablement, requiredness and suggested value of one field after
/// folding every firing rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    pub visible: bool,
    pub enabled: bool,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub should_clear: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        FieldState {
            visible: true,
            enabled: true,
            required: false,
            value: None,
            should_clear: false,
        }
    }
}

impl FieldState {
    pub fn flag(&self, flag: FieldFlag) -> bool {
        match flag {
            FieldFlag::Visible => self.visible,
            FieldFlag::Enabled => self.enabled,
            FieldFlag::Required => self.required,
        }
    }

    pub(crate) fn set_flag(&mut self, flag: FieldFlag, on: bool) {
        match flag {
            FieldFlag::Visible => self.visible = on,
            FieldFlag::Enabled => self.enabled = on,
            FieldFlag::Required => self.required = on,
        }
    }
}

// ─── Validation schema ──────────────────────────────────────────────────────

/// A regular expression that serializes as its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source)
            .map_err(|e| serde::de::Error::custom(format!("invalid pattern '{}': {}", source, e)))
    }
}

/// Constraints for one field. Checks run in a fixed order and the first
/// failure is the field's only error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldRule {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, alias = "min_length", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, alias = "max_length", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Predicate over `(value, form data)` returning an error message.
    #[serde(skip)]
    pub custom: Option<CustomCheck>,
    /// CEL expression form of `custom` for YAML-authored schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    /// Fields whose change re-validates this one.
    #[serde(default, alias = "depends_on", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldRule {
    pub fn new() -> Self {
        FieldRule::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn min(mut self, bound: f64) -> Self {
        self.min = Some(bound);
        self
    }

    pub fn max(mut self, bound: f64) -> Self {
        self.max = Some(bound);
        self
    }

    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Option<String> + Send + Sync + 'static,
    {
        self.custom = Some(CustomCheck::new(check));
        self
    }

    pub fn expr(mut self, expression: impl Into<String>) -> Self {
        self.expr = Some(expression.into());
        self
    }

    pub fn depends_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Field name → constraints for one form type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationSchema {
    pub fields: BTreeMap<String, FieldRule>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        ValidationSchema::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Schema fields that declare `field` in their `dependsOn` list.
    pub fn dependents_of<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(_, rule)| rule.depends_on.iter().any(|d| d == field))
            .map(|(name, _)| name.as_str())
    }
}

/// Knobs of a validation session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Quiet period before a change triggers `validate_all`.
    pub debounce: Duration,
    /// Whether `on_change` schedules validation at all.
    pub validate_on_change: bool,
    /// Empty, non-required fields pass without running further checks.
    pub skip_empty: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            debounce: Duration::from_millis(300),
            validate_on_change: true,
            skip_empty: true,
        }
    }
}

impl ValidationOptions {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_validate_on_change(mut self, on: bool) -> Self {
        self.validate_on_change = on;
        self
    }

    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }
}

// ─── Validation results ─────────────────────────────────────────────────────

/// Outcome of validating one field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResult {
    pub error: Option<String>,
    pub warning: Option<String>,
}

impl FieldResult {
    pub fn ok() -> Self {
        FieldResult::default()
    }

    pub fn error(message: impl Into<String>) -> Self {
        FieldResult {
            error: Some(message.into()),
            warning: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate validation outcome over a schema.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
    pub warnings: BTreeMap<String, String>,
    pub field_validation: BTreeMap<String, bool>,
}

/// What a form needs to render one field's validation feedback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    pub is_valid: bool,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub is_touched: bool,
    pub show_error: bool,
    pub show_warning: bool,
}
