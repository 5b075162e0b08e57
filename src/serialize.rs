//! [`RuleConfig`] → YAML serialization.

use crate::error::SerializeError;
use crate::types::RuleConfig;

/// Serialize a rule configuration to a YAML string.
///
/// Rule order is preserved. Parsing the output with
/// [`parse_rules`](crate::parse::parse_rules) yields an equal configuration.
pub fn serialize_rules(config: &RuleConfig) -> Result<String, SerializeError> {
    // Convert to serde_json::Value first for consistent field ordering
    let value = serde_json::to_value(config).map_err(|e| SerializeError {
        message: format!("failed to convert rule configuration to JSON value: {}", e),
    })?;

    serde_saphyr::to_string(&value).map_err(|e| SerializeError {
        message: format!("failed to serialize to YAML: {}", e),
    })
}
