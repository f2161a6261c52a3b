//! Tool-call input sanitization and result stringification.

use serde_json::Value;
use tracing::debug;

use polybridge_core::ToolDefinition;

/// Undo over-eager JSON parsing on raw string fields.
///
/// Some backend SDKs deep-parse any JSON-looking string in tool arguments.
/// For tools whose schema declares a field as `type: "string"` (file-content
/// bearing tools, typically), an object or array found there is re-serialized
/// to a string before the call is handed to the host tool API.
#[must_use]
pub fn normalize_input(tool: &ToolDefinition, mut input: Value) -> Value {
    let string_fields: Vec<String> = tool
        .string_properties()
        .into_iter()
        .map(str::to_owned)
        .collect();
    if string_fields.is_empty() {
        return input;
    }

    if let Some(map) = input.as_object_mut() {
        for field in string_fields {
            let Some(value) = map.get(&field) else {
                continue;
            };
            if value.is_object() || value.is_array() {
                let restored =
                    serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
                debug!(tool = %tool.name, field = %field, "re-serialized deep-parsed string field");
                map.insert(field, Value::String(restored));
            }
        }
    }

    input
}

/// Collapse a heterogeneous tool result payload into canonical text.
///
/// Providers only accept textual tool outputs, so this sits on the hot path
/// of every tool-result turn and is total: any JSON value produces a string.
/// Precedence: string passthrough, then a `value` field (recursively), then a
/// `text` field, then full JSON stringification. Arrays are stringified
/// element-wise and joined with newlines.
#[must_use]
pub fn stringify_result(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify_result)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                stringify_result(inner)
            } else if let Some(text) = map.get("text") {
                match text {
                    Value::String(s) => s.clone(),
                    other => stringify_result(other),
                }
            } else {
                serde_json::to_string(value).unwrap_or_default()
            }
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_passthrough() {
        assert_eq!(stringify_result(&json!("Sunny")), "Sunny");
    }

    #[test]
    fn test_value_field_precedence() {
        assert_eq!(stringify_result(&json!({"value": "inner"})), "inner");
        // `.value` wins over `.text`.
        assert_eq!(
            stringify_result(&json!({"value": "a", "text": "b"})),
            "a"
        );
    }

    #[test]
    fn test_value_field_recurses() {
        let nested = json!({"value": {"text": "deep"}});
        assert_eq!(stringify_result(&nested), "deep");
    }

    #[test]
    fn test_text_field() {
        assert_eq!(stringify_result(&json!({"text": "hello"})), "hello");
    }

    #[test]
    fn test_arbitrary_object_stringified() {
        let out = stringify_result(&json!({"status": "ok", "code": 200}));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["code"], 200);
    }

    #[test]
    fn test_array_joined_with_newlines() {
        let arr = json!([{"value": "line one"}, "line two", {"text": "line three"}]);
        assert_eq!(stringify_result(&arr), "line one\nline two\nline three");
    }

    #[test]
    fn test_totality_over_primitives() {
        assert_eq!(stringify_result(&json!(42)), "42");
        assert_eq!(stringify_result(&json!(true)), "true");
        assert_eq!(stringify_result(&Value::Null), "");
        assert_eq!(stringify_result(&json!([])), "");
        assert_eq!(stringify_result(&json!([[["x"]]])), "x");
    }

    #[test]
    fn test_normalize_restores_string_field() {
        let tool = ToolDefinition::new("write_file", "write a file").with_schema(json!({
            "type": "object",
            "properties": {"path": {"type": "string"}, "contents": {"type": "string"}}
        }));
        let input = json!({
            "path": "config.json",
            "contents": {"nested": true, "n": 1}
        });
        let normalized = normalize_input(&tool, input);
        assert_eq!(normalized["path"], "config.json");
        let contents = normalized["contents"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(contents).unwrap();
        assert_eq!(parsed["nested"], true);
    }

    #[test]
    fn test_normalize_leaves_other_fields() {
        let tool = ToolDefinition::new("search", "search").with_schema(json!({
            "type": "object",
            "properties": {"query": {"type": "string"}, "filters": {"type": "object"}}
        }));
        let input = json!({"query": "rust", "filters": {"lang": "en"}});
        let normalized = normalize_input(&tool, input.clone());
        assert_eq!(normalized, input);
    }

    #[test]
    fn test_normalize_non_object_input() {
        let tool = ToolDefinition::new("t", "t").with_schema(json!({
            "type": "object",
            "properties": {"s": {"type": "string"}}
        }));
        assert_eq!(normalize_input(&tool, json!("raw")), json!("raw"));
    }
}
