//! Tool definitions consumed from the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Maximum length accepted for a tool name.
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// A tool the model may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name; must satisfy [`validate_tool_name`].
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema for the tool input.
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition with the empty object schema.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_object_schema(),
        }
    }

    /// Set the input schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Validate the definition: name character class plus schema shape.
    pub fn validate(&self) -> Result<(), BridgeError> {
        validate_tool_name(&self.name)?;
        if !self.input_schema.is_object() {
            return Err(BridgeError::configuration(format!(
                "tool '{}' has a non-object input schema",
                self.name
            )));
        }
        Ok(())
    }

    /// Names of schema properties declared `type: "string"`.
    ///
    /// Used by the normalizer to undo over-eager JSON parsing on raw string
    /// fields.
    #[must_use]
    pub fn string_properties(&self) -> Vec<&str> {
        let Some(props) = self
            .input_schema
            .get("properties")
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };
        props
            .iter()
            .filter(|(_, schema)| schema.get("type").and_then(Value::as_str) == Some("string"))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// The empty object schema used when a tool declares no input.
#[must_use]
pub fn empty_object_schema() -> Value {
    serde_json::json!({"type": "object", "properties": {}})
}

/// Check a tool name against the character class every backend understands:
/// ASCII letters, digits, underscore and dash, 1 to 64 characters.
pub fn validate_tool_name(name: &str) -> Result<(), BridgeError> {
    if name.is_empty() || name.len() > MAX_TOOL_NAME_LEN {
        return Err(BridgeError::configuration(format!(
            "tool name '{name}' must be 1-{MAX_TOOL_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BridgeError::configuration(format!(
            "tool name '{name}' contains characters outside [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_tool_name("get_weather").is_ok());
        assert!(validate_tool_name("search-v2").is_ok());
        assert!(validate_tool_name("T0").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_tool_name("invalid name!").is_err());
        assert!(validate_tool_name("").is_err());
        assert!(validate_tool_name(&"x".repeat(65)).is_err());
        assert!(validate_tool_name("emoji🙂").is_err());
    }

    #[test]
    fn test_default_schema() {
        let tool = ToolDefinition::new("noop", "does nothing");
        assert!(tool.validate().is_ok());
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_string_properties() {
        let tool = ToolDefinition::new("write_file", "write a file").with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "contents": {"type": "string"},
                "append": {"type": "boolean"}
            }
        }));
        let mut props = tool.string_properties();
        props.sort_unstable();
        assert_eq!(props, vec!["contents", "path"]);
    }

    #[test]
    fn test_non_object_schema_rejected() {
        let tool = ToolDefinition::new("bad", "broken").with_schema(serde_json::json!("nope"));
        assert!(tool.validate().is_err());
    }
}
