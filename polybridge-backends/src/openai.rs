//! OpenAI-family backend variant.
//!
//! Quirks handled here: tool-call continuation tokens arrive as provider
//! metadata and must be replayed as side-channel options on later turns,
//! reasoning text is replayed exactly once, and the last response id enables
//! cheap continuation via `previous_response_id`.

use std::sync::Arc;

use serde_json::{json, Value};

use polybridge_cache::{NS_LAST_RESPONSE, NS_PENDING_REASONING, NS_TOOL_TOKENS};
use polybridge_core::{BridgeError, ResultData, TokenUsage, ToolCallEvent};
use polybridge_translate::ReplayPolicy;

use crate::client::BackendClient;
use crate::variant::{BackendVariant, HookContext};

/// Variant binding for OpenAI-compatible backends.
pub struct OpenAiVariant {
    client: Arc<dyn BackendClient>,
}

impl OpenAiVariant {
    /// Create the variant around an SDK client.
    #[must_use]
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }
}

impl BackendVariant for OpenAiVariant {
    fn provider_key(&self) -> &str {
        "openai"
    }

    fn client(&self) -> Result<Arc<dyn BackendClient>, BridgeError> {
        Ok(self.client.clone())
    }

    fn reasoning_replay(&self) -> ReplayPolicy {
        ReplayPolicy::SingleUse
    }

    fn provider_options(&self, ctx: &HookContext<'_>) -> Option<Value> {
        let last = ctx.cache.get(NS_LAST_RESPONSE, ctx.conversation_id)?;
        let id = last.as_str()?;
        Some(json!({ "previous_response_id": id }))
    }

    fn process_tool_call_metadata(&self, event: &ToolCallEvent, ctx: &HookContext<'_>) {
        if let Some(metadata) = &event.provider_metadata {
            ctx.cache
                .set(NS_TOOL_TOKENS, &event.tool_call_id, metadata.clone());
        }
    }

    fn process_reasoning_delta(&self, id: Option<&str>, text: &str, ctx: &HookContext<'_>) {
        let key = id.unwrap_or(ctx.conversation_id);
        let mut pending = ctx
            .cache
            .get(NS_PENDING_REASONING, key)
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        pending.push_str(text);
        ctx.cache
            .set(NS_PENDING_REASONING, key, Value::String(pending));
    }

    fn process_response_metadata(&self, result: &ResultData, ctx: &HookContext<'_>) {
        if let Some(id) = &result.response_id {
            ctx.cache
                .set(NS_LAST_RESPONSE, ctx.conversation_id, json!(id));
        }
    }

    fn process_result_data(&self, result: &ResultData) -> TokenUsage {
        let Some(usage) = &result.usage else {
            return TokenUsage::new();
        };
        TokenUsage {
            input_tokens: usage.get("prompt_tokens").and_then(Value::as_u64),
            output_tokens: usage.get("completion_tokens").and_then(Value::as_u64),
            total_tokens: usage.get("total_tokens").and_then(Value::as_u64),
            cache_read_tokens: usage
                .pointer("/prompt_tokens_details/cached_tokens")
                .and_then(Value::as_u64),
            cache_write_tokens: None,
        }
    }

    fn resolve(&self, _model_slug: &str) -> Result<&dyn BackendVariant, BridgeError> {
        Ok(self)
    }
}
