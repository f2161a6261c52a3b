//! Provider-format message and tool types.
//!
//! This is the canonical shape handed to provider SDK collaborators. It is
//! deliberately close to the common denominator of chat-completion APIs:
//! role-tagged messages whose content is either a bare string or a list of
//! typed parts, with tool results carried as dedicated `tool` role messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider-side message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    /// Persistent instruction message.
    System,
    /// End-user content.
    User,
    /// Model output replayed as history.
    Assistant,
    /// Tool invocation result.
    Tool,
}

/// One provider-format message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// Message role.
    pub role: ProviderRole,
    /// Message content.
    pub content: ProviderContent,
    /// For `tool` role messages: the call this result answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ProviderMessage {
    /// Create a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::System,
            content: ProviderContent::Text(text.into()),
            tool_call_id: None,
        }
    }

    /// Create a user message with scalar text content.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::User,
            content: ProviderContent::Text(text.into()),
            tool_call_id: None,
        }
    }

    /// Create a user message with structured parts.
    #[must_use]
    pub fn user_parts(parts: Vec<ProviderPart>) -> Self {
        Self {
            role: ProviderRole::User,
            content: ProviderContent::Parts(parts),
            tool_call_id: None,
        }
    }

    /// Create an assistant message with structured parts.
    #[must_use]
    pub fn assistant_parts(parts: Vec<ProviderPart>) -> Self {
        Self {
            role: ProviderRole::Assistant,
            content: ProviderContent::Parts(parts),
            tool_call_id: None,
        }
    }

    /// Create an assistant message with scalar text content.
    #[must_use]
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::Assistant,
            content: ProviderContent::Text(text.into()),
            tool_call_id: None,
        }
    }

    /// Create a tool result message.
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::Tool,
            content: ProviderContent::Text(content.into()),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Scalar text content, when present.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            ProviderContent::Text(t) => Some(t),
            ProviderContent::Parts(_) => None,
        }
    }

    /// Structured parts, when present.
    #[must_use]
    pub fn parts(&self) -> &[ProviderPart] {
        match &self.content {
            ProviderContent::Parts(parts) => parts,
            ProviderContent::Text(_) => &[],
        }
    }
}

/// Message content: a bare string for backends preferring scalar content,
/// or a typed part list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderContent {
    /// Scalar text content.
    Text(String),
    /// Structured content parts.
    Parts(Vec<ProviderPart>),
}

/// One typed unit of provider message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ProviderPart {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Inline image content.
    Image {
        /// MIME type.
        mime_type: String,
        /// Base64-encoded payload.
        data: String,
    },
    /// Reasoning content replayed from an earlier turn.
    Reasoning {
        /// The reasoning text.
        text: String,
        /// Backend-issued signature, when one exists.
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    /// Tool call replayed from an earlier assistant turn.
    ToolCall {
        /// Call identifier.
        id: String,
        /// Tool name.
        name: String,
        /// Call arguments.
        args: Value,
        /// Provider-specific side-channel options (continuation tokens).
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<Value>,
    },
}

impl ProviderPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part from already-encoded data.
    #[must_use]
    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Create a reasoning part.
    #[must_use]
    pub fn reasoning(text: impl Into<String>, signature: Option<String>) -> Self {
        Self::Reasoning {
            text: text.into(),
            signature,
        }
    }
}

/// A tool definition in provider format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTool {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for the input.
    pub input_schema: Value,
}
