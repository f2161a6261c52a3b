//! Response accumulation during streaming.
//!
//! Deltas arrive one at a time; the accumulator coalesces consecutive
//! deltas of the same kind into segments so the audit record mirrors the
//! logical parts of the response rather than its chunking.

use chrono::Utc;

use polybridge_core::{ContentPart, TokenUsage, ToolCallContent};

use crate::audit::ResponseSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Text,
    Thinking,
}

/// Accumulates host-format parts into the final response shape.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    text_parts: Vec<String>,
    thinking_parts: Vec<String>,
    tool_call_parts: Vec<ToolCallContent>,
    current: Option<Segment>,
}

impl ResponseAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one delivered part in.
    pub fn push(&mut self, part: &ContentPart) {
        match part {
            ContentPart::Text(text) => {
                if self.current == Some(Segment::Text) {
                    if let Some(last) = self.text_parts.last_mut() {
                        last.push_str(&text.value);
                        return;
                    }
                }
                self.text_parts.push(text.value.clone());
                self.current = Some(Segment::Text);
            }
            ContentPart::Thinking(think) => {
                // Synthetic retry banners are host display artifacts, not
                // model output.
                if think.is_error_marker() {
                    return;
                }
                if self.current == Some(Segment::Thinking) {
                    if let Some(last) = self.thinking_parts.last_mut() {
                        last.push_str(&think.value);
                        return;
                    }
                }
                self.thinking_parts.push(think.value.clone());
                self.current = Some(Segment::Thinking);
            }
            ContentPart::ToolCall(call) => {
                self.tool_call_parts.push(call.clone());
                self.current = None;
            }
            _ => {}
        }
    }

    /// Combined text so far.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.text_parts.join("")
    }

    /// Check if nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_parts.is_empty()
            && self.thinking_parts.is_empty()
            && self.tool_call_parts.is_empty()
    }

    /// Close out the accumulator into an audit snapshot.
    #[must_use]
    pub fn into_snapshot(
        self,
        usage: TokenUsage,
        duration_ms: u64,
        tokens_per_second: Option<f64>,
    ) -> ResponseSnapshot {
        ResponseSnapshot {
            text_parts: self.text_parts,
            thinking_parts: self.thinking_parts,
            tool_call_parts: self.tool_call_parts,
            usage,
            duration_ms,
            tokens_per_second,
            timestamp: Utc::now(),
        }
    }
}
