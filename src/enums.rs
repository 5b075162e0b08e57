//! Enumerations used by rule and schema configuration.
//!
//! [`Operator`] and [`ActionKind`] are "open" enums: any name outside the known
//! set is kept verbatim in an `Other` variant so a misconfigured rule still
//! parses and simply never fires. [`Logic`] is closed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison performed by a single condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    NotContains,
    In,
    NotIn,
    Exists,
    NotExists,
    /// Unrecognised operator name. Always evaluates to `false`.
    Other(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::Other(name) => name,
        }
    }

    /// Operators that compare against the scalar `value` operand.
    pub fn uses_value(&self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::GreaterThan
                | Operator::LessThan
                | Operator::Contains
                | Operator::NotContains
        )
    }

    /// Operators that test membership in the `values` list.
    pub fn uses_values(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "exists" => Operator::Exists,
            "not_exists" => Operator::NotExists,
            _ => Operator::Other(name),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the conditions of a rule combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logic {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// Effect applied to the targets of a firing rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Show,
    Hide,
    Enable,
    Disable,
    Require,
    Optional,
    SetValue,
    ClearValue,
    /// Unrecognised action name. Applying it changes nothing.
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Show => "show",
            ActionKind::Hide => "hide",
            ActionKind::Enable => "enable",
            ActionKind::Disable => "disable",
            ActionKind::Require => "require",
            ActionKind::Optional => "optional",
            ActionKind::SetValue => "set_value",
            ActionKind::ClearValue => "clear_value",
            ActionKind::Other(name) => name,
        }
    }

    /// The field attribute this action writes and the value it writes, for the
    /// three boolean attributes. `None` for value actions and unknown kinds.
    pub fn flag_effect(&self) -> Option<(FieldFlag, bool)> {
        match self {
            ActionKind::Show => Some((FieldFlag::Visible, true)),
            ActionKind::Hide => Some((FieldFlag::Visible, false)),
            ActionKind::Enable => Some((FieldFlag::Enabled, true)),
            ActionKind::Disable => Some((FieldFlag::Enabled, false)),
            ActionKind::Require => Some((FieldFlag::Required, true)),
            ActionKind::Optional => Some((FieldFlag::Required, false)),
            _ => None,
        }
    }
}

impl From<String> for ActionKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "show" => ActionKind::Show,
            "hide" => ActionKind::Hide,
            "enable" => ActionKind::Enable,
            "disable" => ActionKind::Disable,
            "require" => ActionKind::Require,
            "optional" => ActionKind::Optional,
            "set_value" => ActionKind::SetValue,
            "clear_value" => ActionKind::ClearValue,
            _ => ActionKind::Other(name),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean attribute of a field state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldFlag {
    Visible,
    Enabled,
    Required,
}

impl fmt::Display for FieldFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFlag::Visible => f.write_str("visible"),
            FieldFlag::Enabled => f.write_str("enabled"),
            FieldFlag::Required => f.write_str("required"),
        }
    }
}

/// Where a validation session sits in its debounce cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebouncePhase {
    Idle,
    Debouncing,
}
