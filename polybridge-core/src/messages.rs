//! Host conversation message types.
//!
//! This module defines the fixed, role-based conversation vocabulary the host
//! chat interface speaks: messages tagged by role, each holding an ordered
//! sequence of content parts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Conversation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions that shape the assistant's behavior.
    System,
    /// Content authored by the end user.
    User,
    /// Content produced by the model.
    Assistant,
    /// Tool invocation results.
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// Plain text content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text value.
    pub value: String,
}

impl TextContent {
    /// Create a new text content.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Check if the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Opaque reasoning trace attached to an assistant turn.
///
/// The `id` is backend-specific; the sentinel [`ThinkingContent::ERROR_MARKER_ID`]
/// marks a locally generated transient-failure banner that exists only for
/// display in the host transcript and must never be replayed to a backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkingContent {
    /// The reasoning text.
    pub value: String,
    /// Backend-specific identifier for this trace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ThinkingContent {
    /// Identifier tagging a synthetic local-error banner.
    pub const ERROR_MARKER_ID: &'static str = "bridge-local-error";

    /// Create a new thinking content.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            id: None,
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Create a synthetic error banner for the host transcript.
    #[must_use]
    pub fn error_marker(message: impl Into<String>) -> Self {
        Self::new(message).with_id(Self::ERROR_MARKER_ID)
    }

    /// Check whether this trace is a local error banner.
    #[must_use]
    pub fn is_error_marker(&self) -> bool {
        self.id.as_deref() == Some(Self::ERROR_MARKER_ID)
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallContent {
    /// Identifier pairing this call with its later result.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Tool input arguments.
    pub input: Value,
}

impl ToolCallContent {
    /// Create a new tool call.
    #[must_use]
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            input,
        }
    }
}

/// The outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultContent {
    /// Identifier of the tool call this answers.
    pub call_id: String,
    /// Tool name, when the host supplies it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool output payload; shape is host-defined and heterogeneous.
    pub output: Value,
}

impl ToolResultContent {
    /// Create a new tool result.
    #[must_use]
    pub fn new(call_id: impl Into<String>, output: Value) -> Self {
        Self {
            call_id: call_id.into(),
            name: None,
            output,
        }
    }

    /// Set the tool name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Inline binary content, used only for image input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContent {
    /// MIME type of the payload (e.g. `image/png`).
    pub mime_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl DataContent {
    /// Create a new data content.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Base64-encode the payload for wire formats that require it.
    #[must_use]
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// One typed unit of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
pub enum ContentPart {
    /// Plain text.
    Text(TextContent),
    /// Opaque reasoning trace.
    Thinking(ThinkingContent),
    /// Tool invocation request.
    ToolCall(ToolCallContent),
    /// Tool invocation result.
    ToolResult(ToolResultContent),
    /// Inline binary data (image input).
    Data(DataContent),
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(TextContent::new(value))
    }

    /// Create a thinking part.
    #[must_use]
    pub fn thinking(value: impl Into<String>) -> Self {
        Self::Thinking(ThinkingContent::new(value))
    }

    /// Create a tool call part.
    #[must_use]
    pub fn tool_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self::ToolCall(ToolCallContent::new(call_id, name, input))
    }

    /// Create a tool result part.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, output: Value) -> Self {
        Self::ToolResult(ToolResultContent::new(call_id, output))
    }

    /// Create an image data part.
    #[must_use]
    pub fn data(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Data(DataContent::new(mime_type, bytes))
    }

    /// Check if this is a text part.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Check if this is a thinking part.
    #[must_use]
    pub fn is_thinking(&self) -> bool {
        matches!(self, Self::Thinking(_))
    }

    /// Check if this is a tool call part.
    #[must_use]
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall(_))
    }

    /// Check if this is a tool result part.
    #[must_use]
    pub fn is_tool_result(&self) -> bool {
        matches!(self, Self::ToolResult(_))
    }

    /// Get the text value if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.value),
            _ => None,
        }
    }
}

impl From<TextContent> for ContentPart {
    fn from(c: TextContent) -> Self {
        Self::Text(c)
    }
}

impl From<ThinkingContent> for ContentPart {
    fn from(c: ThinkingContent) -> Self {
        Self::Thinking(c)
    }
}

impl From<ToolCallContent> for ContentPart {
    fn from(c: ToolCallContent) -> Self {
        Self::ToolCall(c)
    }
}

impl From<ToolResultContent> for ContentPart {
    fn from(c: ToolResultContent) -> Self {
        Self::ToolResult(c)
    }
}

/// A single conversation message: a role plus ordered content parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The message role.
    pub role: Role,
    /// Ordered content parts.
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    /// Create an empty message with the given role.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            parts: Vec::new(),
        }
    }

    /// Create a message with parts.
    #[must_use]
    pub fn with_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self { role, parts }
    }

    /// Create a system message with a single text part.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_parts(Role::System, vec![ContentPart::text(text)])
    }

    /// Create a user message with a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_parts(Role::User, vec![ContentPart::text(text)])
    }

    /// Create an assistant message with a single text part.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_parts(Role::Assistant, vec![ContentPart::text(text)])
    }

    /// Add a part.
    pub fn add_part(&mut self, part: ContentPart) {
        self.parts.push(part);
    }

    /// Add a part, builder style.
    #[must_use]
    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Iterate over text parts.
    pub fn text_parts(&self) -> impl Iterator<Item = &TextContent> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::Text(t) => Some(t),
            _ => None,
        })
    }

    /// Iterate over tool call parts.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallContent> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::ToolCall(t) => Some(t),
            _ => None,
        })
    }

    /// Iterate over tool result parts.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResultContent> {
        self.parts.iter().filter_map(|p| match p {
            ContentPart::ToolResult(t) => Some(t),
            _ => None,
        })
    }

    /// Combined text of all text parts.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.text_parts()
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Check if the message has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Verify the tool call/result pairing invariant over a history.
///
/// Every `ToolCall` in an assistant turn must be answered by at most one
/// later `ToolResult` carrying the same `call_id`, and every `ToolResult`
/// must answer a call that actually appeared earlier. Histories violating
/// this are rejected rather than silently merged.
pub fn verify_tool_pairing(messages: &[ChatMessage]) -> Result<(), BridgeError> {
    let mut open: Vec<&str> = Vec::new();
    let mut answered: Vec<&str> = Vec::new();

    for message in messages {
        for part in &message.parts {
            match part {
                ContentPart::ToolCall(call) => {
                    open.push(&call.call_id);
                }
                ContentPart::ToolResult(result) => {
                    let id = result.call_id.as_str();
                    if !open.contains(&id) {
                        return Err(BridgeError::translation(format!(
                            "tool result '{id}' answers no prior tool call"
                        )));
                    }
                    if answered.contains(&id) {
                        return Err(BridgeError::translation(format!(
                            "tool call '{id}' answered more than once"
                        )));
                    }
                    answered.push(id);
                }
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_builders() {
        let msg = ChatMessage::user("Hi");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text_content(), "Hi");
    }

    #[test]
    fn test_error_marker() {
        let banner = ThinkingContent::error_marker("request failed, retrying");
        assert!(banner.is_error_marker());

        let regular = ThinkingContent::new("hmm").with_id("sig_abc");
        assert!(!regular.is_error_marker());
    }

    #[test]
    fn test_serde_roundtrip() {
        let msg = ChatMessage::with_parts(
            Role::Assistant,
            vec![
                ContentPart::text("Checking the weather."),
                ContentPart::tool_call("c1", "get_weather", serde_json::json!({"city": "NYC"})),
            ],
        );
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, parsed);
    }

    #[test]
    fn test_part_kind_tags() {
        let json = serde_json::to_value(ContentPart::text("x")).unwrap();
        assert_eq!(json["part_kind"], "text");

        let json = serde_json::to_value(ContentPart::tool_result("c1", Value::Null)).unwrap();
        assert_eq!(json["part_kind"], "tool-result");
    }

    #[test]
    fn test_pairing_ok() {
        let history = vec![
            ChatMessage::user("weather?"),
            ChatMessage::with_parts(
                Role::Assistant,
                vec![ContentPart::tool_call(
                    "c1",
                    "get_weather",
                    serde_json::json!({}),
                )],
            ),
            ChatMessage::with_parts(
                Role::Tool,
                vec![ContentPart::tool_result("c1", serde_json::json!("Sunny"))],
            ),
        ];
        assert!(verify_tool_pairing(&history).is_ok());
    }

    #[test]
    fn test_pairing_unanswered_call_is_ok() {
        // A trailing call with no result yet is legal mid-conversation.
        let history = vec![ChatMessage::with_parts(
            Role::Assistant,
            vec![ContentPart::tool_call("c1", "t", serde_json::json!({}))],
        )];
        assert!(verify_tool_pairing(&history).is_ok());
    }

    #[test]
    fn test_pairing_orphan_result_rejected() {
        let history = vec![ChatMessage::with_parts(
            Role::Tool,
            vec![ContentPart::tool_result("ghost", Value::Null)],
        )];
        assert!(verify_tool_pairing(&history).is_err());
    }

    #[test]
    fn test_pairing_double_answer_rejected() {
        let history = vec![
            ChatMessage::with_parts(
                Role::Assistant,
                vec![ContentPart::tool_call("c1", "t", serde_json::json!({}))],
            ),
            ChatMessage::with_parts(
                Role::Tool,
                vec![
                    ContentPart::tool_result("c1", Value::Null),
                    ContentPart::tool_result("c1", Value::Null),
                ],
            ),
        ];
        assert!(verify_tool_pairing(&history).is_err());
    }

    #[test]
    fn test_data_to_base64() {
        let data = DataContent::new("image/png", vec![0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(data.to_base64(), "iVBORw==");
    }
}
