//! Incremental streaming vocabulary between backends and the core.
//!
//! Backends emit [`StreamingPart`]s while generating; the orchestrator
//! forwards them to the host in receipt order. Post-stream result data
//! (usage, response identifier) travels in a separate [`BackendEvent::Finish`]
//! carrier so the part set stays closed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One incremental unit of backend output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "snake_case")]
pub enum StreamingPart {
    /// Incremental reasoning text.
    ReasoningDelta {
        /// Backend-specific trace identifier.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// The reasoning text delta.
        text: String,
    },
    /// Incremental response text.
    TextDelta {
        /// The text delta.
        text: String,
    },
    /// A complete tool invocation request.
    ToolCallEvent(ToolCallEvent),
}

impl StreamingPart {
    /// Create a reasoning delta.
    #[must_use]
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::ReasoningDelta {
            id: None,
            text: text.into(),
        }
    }

    /// Create a reasoning delta with a trace identifier.
    #[must_use]
    pub fn reasoning_with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ReasoningDelta {
            id: Some(id.into()),
            text: text.into(),
        }
    }

    /// Create a text delta.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    /// Create a tool call event.
    #[must_use]
    pub fn tool_call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self::ToolCallEvent(ToolCallEvent::new(tool_call_id, tool_name, input))
    }

    /// Check if this is a text delta.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::TextDelta { .. })
    }

    /// Check if this is a reasoning delta.
    #[must_use]
    pub fn is_reasoning(&self) -> bool {
        matches!(self, Self::ReasoningDelta { .. })
    }

    /// Check if this is a tool call event.
    #[must_use]
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCallEvent(_))
    }
}

/// A tool invocation surfaced mid-stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallEvent {
    /// Backend-assigned call identifier.
    pub tool_call_id: String,
    /// Name of the requested tool.
    pub tool_name: String,
    /// Parsed input arguments.
    pub input: Value,
    /// Opaque provider side-channel data (continuation tokens and the like).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<Value>,
}

impl ToolCallEvent {
    /// Create a new tool call event.
    #[must_use]
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            input,
            provider_metadata: None,
        }
    }

    /// Attach provider metadata.
    #[must_use]
    pub fn with_provider_metadata(mut self, metadata: Value) -> Self {
        self.provider_metadata = Some(metadata);
        self
    }
}

/// Post-stream payload consumed by the finalize phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    /// Provider response identifier, for cheap continuation on the next turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// Raw usage payload in the provider's shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    /// Any other provider metadata attached to the finished response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<Value>,
}

impl ResultData {
    /// Create an empty result payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response identifier.
    #[must_use]
    pub fn with_response_id(mut self, id: impl Into<String>) -> Self {
        self.response_id = Some(id.into());
        self
    }

    /// Set the raw usage payload.
    #[must_use]
    pub fn with_usage(mut self, usage: Value) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Set provider metadata.
    #[must_use]
    pub fn with_provider_metadata(mut self, metadata: Value) -> Self {
        self.provider_metadata = Some(metadata);
        self
    }
}

/// One item of a backend SDK stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum BackendEvent {
    /// An incremental content part, forwarded to the host in order.
    Part(StreamingPart),
    /// The stream finished; carries usage and response metadata.
    Finish(ResultData),
}

impl BackendEvent {
    /// Create a part event.
    #[must_use]
    pub fn part(part: StreamingPart) -> Self {
        Self::Part(part)
    }

    /// Create a finish event.
    #[must_use]
    pub fn finish(result: ResultData) -> Self {
        Self::Finish(result)
    }
}
