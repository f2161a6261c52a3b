//! Bidirectional conversion between host and provider formats.
//!
//! Pure, stateless translation with one explicit side-channel: cross-turn
//! continuation state is read from (and, for single-use entries, deleted
//! from) the metadata cache, keyed by the same `call_id`/trace id that
//! threads through the conversation data itself.

use serde_json::Value;
use tracing::{debug, warn};

use polybridge_cache::{CacheRegistry, NS_PENDING_REASONING, NS_TOOL_TOKENS};
use polybridge_core::{
    empty_object_schema, validate_tool_name, verify_tool_pairing, BridgeError, ChatMessage,
    ContentPart, Role, StreamingPart, ThinkingContent, ToolDefinition,
};

use crate::normalize::{normalize_input, stringify_result};
use crate::provider::{ProviderMessage, ProviderPart, ProviderTool};

/// How a backend accepts system instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemPromptMode {
    /// A `system` role message in the message array.
    #[default]
    Native,
    /// The backend's dedicated system-prompt parameter; system turns are
    /// extracted from the array.
    Parameter,
    /// The backend forbids persistent identity messages; system turns are
    /// discarded.
    Drop,
}

/// Lifetime of cached reasoning continuation state.
///
/// Backends disagree here: some require reasoning text to be replayed once
/// and forgotten, others re-read it on every subsequent turn. Declared per
/// backend variant, never assumed globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayPolicy {
    /// The translator deletes the entry after folding it into a message.
    SingleUse,
    /// The entry survives repeated replay across turns.
    #[default]
    Persistent,
}

/// Per-backend knobs consumed during outbound translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationOptions {
    /// System instruction handling.
    pub system_mode: SystemPromptMode,
    /// Reasoning continuation lifetime.
    pub reasoning_replay: ReplayPolicy,
}

/// Result of translating a host history to provider format.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedConversation {
    /// System text extracted for backends using a dedicated parameter.
    pub system: Option<String>,
    /// Provider-format messages.
    pub messages: Vec<ProviderMessage>,
}

/// Translate a host conversation history into provider format.
///
/// Role order is preserved. The tool pairing invariant is checked up front;
/// violating histories are rejected rather than silently merged.
pub fn to_provider(
    messages: &[ChatMessage],
    opts: &TranslationOptions,
    cache: &CacheRegistry,
) -> Result<TranslatedConversation, BridgeError> {
    verify_tool_pairing(messages)?;

    let mut system_param: Vec<String> = Vec::new();
    let mut out: Vec<ProviderMessage> = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                let text = message
                    .text_parts()
                    .next()
                    .map(|t| t.value.clone())
                    .unwrap_or_default();
                match opts.system_mode {
                    SystemPromptMode::Native => out.push(ProviderMessage::system(text)),
                    SystemPromptMode::Parameter => system_param.push(text),
                    SystemPromptMode::Drop => {
                        debug!("backend rejects persistent identity messages; system turn discarded");
                    }
                }
            }
            Role::User | Role::Tool => translate_user_turn(message, &mut out),
            Role::Assistant => translate_assistant_turn(message, opts, cache, &mut out),
        }
    }

    let system = if system_param.is_empty() {
        None
    } else {
        Some(system_param.join("\n\n"))
    };

    Ok(TranslatedConversation {
        system,
        messages: out,
    })
}

fn translate_user_turn(message: &ChatMessage, out: &mut Vec<ProviderMessage>) {
    // Several backends reject empty content arrays; an empty turn becomes
    // an explicit empty string.
    if message.parts.is_empty() {
        out.push(ProviderMessage::user_text(String::new()));
        return;
    }

    let mut pending: Vec<ProviderPart> = Vec::new();
    for part in &message.parts {
        match part {
            ContentPart::Text(t) => pending.push(ProviderPart::text(&t.value)),
            ContentPart::Data(d) => {
                pending.push(ProviderPart::image(&d.mime_type, d.to_base64()));
            }
            ContentPart::ToolResult(result) => {
                flush_user_parts(&mut pending, out);
                out.push(ProviderMessage::tool(
                    &result.call_id,
                    stringify_result(&result.output),
                ));
            }
            other => pending.push(fallback_text(other)),
        }
    }
    flush_user_parts(&mut pending, out);
}

fn flush_user_parts(pending: &mut Vec<ProviderPart>, out: &mut Vec<ProviderMessage>) {
    if pending.is_empty() {
        return;
    }
    let parts = std::mem::take(pending);
    out.push(collapse(parts, ProviderMessage::user_text, ProviderMessage::user_parts));
}

fn translate_assistant_turn(
    message: &ChatMessage,
    opts: &TranslationOptions,
    cache: &CacheRegistry,
    out: &mut Vec<ProviderMessage>,
) {
    let mut parts: Vec<ProviderPart> = Vec::new();

    for part in &message.parts {
        match part {
            ContentPart::Text(t) => parts.push(ProviderPart::text(&t.value)),
            ContentPart::Thinking(think) => {
                // Local error banners exist only for the host transcript.
                if think.is_error_marker() {
                    continue;
                }
                parts.push(reasoning_part(think, opts, cache));
            }
            ContentPart::ToolCall(call) => {
                // Continuation tokens are read, not deleted: they must
                // survive repeated replay of history across turns.
                let options = cache.get(NS_TOOL_TOKENS, &call.call_id);
                parts.push(ProviderPart::ToolCall {
                    id: call.call_id.clone(),
                    name: call.name.clone(),
                    args: call.input.clone(),
                    options,
                });
            }
            other => parts.push(fallback_text(other)),
        }
    }

    if parts.is_empty() {
        return;
    }
    out.push(collapse(
        parts,
        ProviderMessage::assistant_text,
        ProviderMessage::assistant_parts,
    ));
}

fn reasoning_part(
    think: &ThinkingContent,
    opts: &TranslationOptions,
    cache: &CacheRegistry,
) -> ProviderPart {
    let mut text = think.value.clone();
    if let Some(id) = &think.id {
        if let Some(pending) = cache.get(NS_PENDING_REASONING, id) {
            if let Some(full) = pending.as_str() {
                text = full.to_string();
            }
            if opts.reasoning_replay == ReplayPolicy::SingleUse {
                cache.delete(NS_PENDING_REASONING, id);
            }
        }
    }
    ProviderPart::reasoning(text, think.id.clone())
}

/// Multi-part content collapses to a scalar string only when exactly one
/// part exists and it is text.
fn collapse(
    parts: Vec<ProviderPart>,
    scalar: impl FnOnce(String) -> ProviderMessage,
    structured: impl FnOnce(Vec<ProviderPart>) -> ProviderMessage,
) -> ProviderMessage {
    if parts.len() == 1 {
        if let ProviderPart::Text { text } = &parts[0] {
            return scalar(text.clone());
        }
    }
    structured(parts)
}

/// Best-effort text rendering for a part that does not fit its role, kept
/// rather than dropped so the message array stays non-empty and valid.
fn fallback_text(part: &ContentPart) -> ProviderPart {
    let rendered = serde_json::to_string(part).unwrap_or_default();
    warn!(part_kind = ?part, "content part not valid for this role; rendered as text");
    ProviderPart::text(rendered)
}

/// Translate one backend streaming part into a host content part.
///
/// Malformed tool-call arguments are logged and the call is dropped rather
/// than emitted half-formed.
pub fn to_host(part: StreamingPart, tools: &[ToolDefinition]) -> Option<ContentPart> {
    match part {
        StreamingPart::ReasoningDelta { id, text } => {
            let mut think = ThinkingContent::new(text);
            think.id = id;
            Some(ContentPart::Thinking(think))
        }
        StreamingPart::TextDelta { text } => Some(ContentPart::text(text)),
        StreamingPart::ToolCallEvent(event) => {
            let input = match parse_tool_input(event.input) {
                Some(input) => input,
                None => {
                    warn!(
                        tool = %event.tool_name,
                        call_id = %event.tool_call_id,
                        "unparseable tool-call arguments; call dropped"
                    );
                    return None;
                }
            };
            let input = match tools.iter().find(|t| t.name == event.tool_name) {
                Some(tool) => normalize_input(tool, input),
                None => input,
            };
            Some(ContentPart::tool_call(
                event.tool_call_id,
                event.tool_name,
                input,
            ))
        }
    }
}

fn parse_tool_input(input: Value) -> Option<Value> {
    match input {
        Value::String(raw) => serde_json::from_str(&raw).ok(),
        other => Some(other),
    }
}

/// Translate host tool definitions to provider format.
///
/// Validation happens here, before any request is sent: a name outside the
/// universally understood character class is a configuration error.
pub fn tools_to_provider(tools: &[ToolDefinition]) -> Result<Vec<ProviderTool>, BridgeError> {
    tools
        .iter()
        .map(|tool| {
            validate_tool_name(&tool.name)?;
            let input_schema = if tool.input_schema.is_null() {
                empty_object_schema()
            } else {
                tool.input_schema.clone()
            };
            if !input_schema.is_object() {
                return Err(BridgeError::configuration(format!(
                    "tool '{}' has a non-object input schema",
                    tool.name
                )));
            }
            Ok(ProviderTool {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderRole;
    use polybridge_core::{ToolCallEvent, ToolResultContent};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn registry() -> CacheRegistry {
        CacheRegistry::new()
    }

    #[test]
    fn test_roles_and_text_preserved() {
        let history = vec![
            ChatMessage::system("Be helpful."),
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello!"),
            ChatMessage::user("Bye"),
        ];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();

        let roles: Vec<ProviderRole> = translated.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ProviderRole::System,
                ProviderRole::User,
                ProviderRole::Assistant,
                ProviderRole::User
            ]
        );
        let texts: Vec<&str> = translated
            .messages
            .iter()
            .filter_map(|m| m.as_text())
            .collect();
        assert_eq!(texts, vec!["Be helpful.", "Hi", "Hello!", "Bye"]);
    }

    #[test]
    fn test_system_parameter_mode() {
        let opts = TranslationOptions {
            system_mode: SystemPromptMode::Parameter,
            ..TranslationOptions::default()
        };
        let history = vec![ChatMessage::system("Be terse."), ChatMessage::user("Hi")];
        let translated = to_provider(&history, &opts, &registry()).unwrap();
        assert_eq!(translated.system.as_deref(), Some("Be terse."));
        assert_eq!(translated.messages.len(), 1);
    }

    #[test]
    fn test_system_drop_mode() {
        let opts = TranslationOptions {
            system_mode: SystemPromptMode::Drop,
            ..TranslationOptions::default()
        };
        let history = vec![ChatMessage::system("Be terse."), ChatMessage::user("Hi")];
        let translated = to_provider(&history, &opts, &registry()).unwrap();
        assert!(translated.system.is_none());
        assert_eq!(translated.messages.len(), 1);
        assert_eq!(translated.messages[0].role, ProviderRole::User);
    }

    #[test]
    fn test_single_text_collapses_to_scalar() {
        let history = vec![ChatMessage::user("just text")];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();
        assert_eq!(translated.messages[0].as_text(), Some("just text"));
    }

    #[test]
    fn test_mixed_content_stays_structured() {
        let history = vec![ChatMessage::with_parts(
            Role::User,
            vec![
                ContentPart::text("look at this"),
                ContentPart::data("image/png", vec![1, 2, 3]),
            ],
        )];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();
        assert_eq!(translated.messages[0].parts().len(), 2);
        assert!(matches!(
            translated.messages[0].parts()[1],
            ProviderPart::Image { .. }
        ));
    }

    #[test]
    fn test_empty_user_turn_becomes_empty_string() {
        let history = vec![ChatMessage::new(Role::User)];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();
        assert_eq!(translated.messages[0].as_text(), Some(""));
    }

    #[test]
    fn test_tool_call_and_result_scenario() {
        // Prior turn: assistant calls get_weather, host answers with Sunny.
        let history = vec![
            ChatMessage::user("weather in NYC?"),
            ChatMessage::with_parts(
                Role::Assistant,
                vec![ContentPart::tool_call(
                    "c1",
                    "get_weather",
                    json!({"location": "NYC"}),
                )],
            ),
            ChatMessage::with_parts(
                Role::Tool,
                vec![ContentPart::ToolResult(ToolResultContent::new(
                    "c1",
                    json!([{"part_kind": "text", "value": "Sunny"}]),
                ))],
            ),
        ];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();

        assert_eq!(translated.messages.len(), 3);
        let assistant = &translated.messages[1];
        assert_eq!(assistant.role, ProviderRole::Assistant);
        assert!(matches!(
            &assistant.parts()[0],
            ProviderPart::ToolCall { id, name, .. } if id == "c1" && name == "get_weather"
        ));

        let tool_msg = &translated.messages[2];
        assert_eq!(tool_msg.role, ProviderRole::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_msg.as_text(), Some("Sunny"));
    }

    #[test]
    fn test_mismatched_pairing_rejected() {
        let history = vec![ChatMessage::with_parts(
            Role::Tool,
            vec![ContentPart::tool_result("orphan", json!("x"))],
        )];
        assert!(to_provider(&history, &TranslationOptions::default(), &registry()).is_err());
    }

    #[test]
    fn test_error_marker_never_replayed() {
        let history = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![
                ContentPart::Thinking(ThinkingContent::error_marker("attempt 1 failed")),
                ContentPart::text("Recovered answer"),
            ],
        )];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();
        assert_eq!(translated.messages.len(), 1);
        assert_eq!(translated.messages[0].as_text(), Some("Recovered answer"));
    }

    #[test]
    fn test_assistant_with_only_error_marker_vanishes() {
        let history = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![ContentPart::Thinking(ThinkingContent::error_marker("oops"))],
        )];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();
        assert!(translated.messages.is_empty());
    }

    #[test]
    fn test_continuation_token_attached_and_survives() {
        let cache = registry();
        cache.set(NS_TOOL_TOKENS, "c1", json!("opaque-token"));

        let history = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![ContentPart::tool_call("c1", "search", json!({}))],
        )];

        for _ in 0..2 {
            let translated =
                to_provider(&history, &TranslationOptions::default(), &cache).unwrap();
            let ProviderPart::ToolCall { options, .. } = &translated.messages[0].parts()[0]
            else {
                panic!("expected tool call part");
            };
            assert_eq!(options.as_ref(), Some(&json!("opaque-token")));
        }
        // Read, not consumed.
        assert!(cache.has(NS_TOOL_TOKENS, "c1"));
    }

    #[test]
    fn test_pending_reasoning_single_use() {
        let cache = registry();
        cache.set(NS_PENDING_REASONING, "trace-1", json!("full reasoning text"));

        let opts = TranslationOptions {
            reasoning_replay: ReplayPolicy::SingleUse,
            ..TranslationOptions::default()
        };
        let history = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![ContentPart::Thinking(
                ThinkingContent::new("summary").with_id("trace-1"),
            )],
        )];

        let translated = to_provider(&history, &opts, &cache).unwrap();
        let ProviderPart::Reasoning { text, .. } = &translated.messages[0].parts()[0] else {
            panic!("expected reasoning part");
        };
        assert_eq!(text, "full reasoning text");
        // Deleted by the reader after being folded in.
        assert!(!cache.has(NS_PENDING_REASONING, "trace-1"));
    }

    #[test]
    fn test_pending_reasoning_persistent() {
        let cache = registry();
        cache.set(NS_PENDING_REASONING, "trace-1", json!("full reasoning text"));

        let history = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![ContentPart::Thinking(
                ThinkingContent::new("summary").with_id("trace-1"),
            )],
        )];

        let translated =
            to_provider(&history, &TranslationOptions::default(), &cache).unwrap();
        assert_eq!(translated.messages.len(), 1);
        assert!(cache.has(NS_PENDING_REASONING, "trace-1"));
    }

    #[test]
    fn test_misplaced_part_falls_back_to_text() {
        // A tool call inside a user turn is not a valid combination; it is
        // rendered as text rather than dropped.
        let history = vec![ChatMessage::with_parts(
            Role::User,
            vec![ContentPart::tool_call("c9", "weird", json!({}))],
        )];
        let translated =
            to_provider(&history, &TranslationOptions::default(), &registry()).unwrap();
        let text = translated.messages[0].as_text().unwrap();
        assert!(text.contains("c9"));
    }

    #[test]
    fn test_to_host_text_and_reasoning() {
        let part = to_host(StreamingPart::text("Hello"), &[]).unwrap();
        assert_eq!(part.as_text(), Some("Hello"));

        let part = to_host(StreamingPart::reasoning_with_id("sig", "hmm"), &[]).unwrap();
        assert!(part.is_thinking());
    }

    #[test]
    fn test_to_host_tool_call_parses_string_args() {
        let event = ToolCallEvent::new("c1", "search", json!(r#"{"q": "rust"}"#));
        let part = to_host(StreamingPart::ToolCallEvent(event), &[]).unwrap();
        let ContentPart::ToolCall(call) = part else {
            panic!("expected tool call");
        };
        assert_eq!(call.input["q"], "rust");
    }

    #[test]
    fn test_to_host_drops_malformed_tool_call() {
        let event = ToolCallEvent::new("c1", "search", json!("{not json"));
        assert!(to_host(StreamingPart::ToolCallEvent(event), &[]).is_none());
    }

    #[test]
    fn test_to_host_normalizes_against_schema() {
        let tool = ToolDefinition::new("write_file", "write").with_schema(json!({
            "type": "object",
            "properties": {"contents": {"type": "string"}}
        }));
        let event = ToolCallEvent::new("c1", "write_file", json!({"contents": {"a": 1}}));
        let part = to_host(StreamingPart::ToolCallEvent(event), &[tool]).unwrap();
        let ContentPart::ToolCall(call) = part else {
            panic!("expected tool call");
        };
        assert!(call.input["contents"].is_string());
    }

    #[test]
    fn test_tools_to_provider_rejects_invalid_name() {
        let tools = vec![ToolDefinition::new("invalid name!", "broken")];
        let err = tools_to_provider(&tools).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration(_)));
    }

    #[test]
    fn test_tools_missing_schema_defaults_to_empty_object() {
        let tools = vec![ToolDefinition::new("noop", "nothing").with_schema(Value::Null)];
        let translated = tools_to_provider(&tools).unwrap();
        assert_eq!(translated[0].input_schema["type"], "object");
    }
}
