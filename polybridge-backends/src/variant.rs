//! The backend variant strategy trait.
//!
//! Each upstream provider family's quirks (system-message support, caching
//! breakpoints, continuation tokens, usage-shape differences) live in one
//! strategy object with overridable hook methods. The orchestrator is
//! provider-agnostic; everything provider-specific happens through these
//! hooks.

use std::sync::Arc;

use serde_json::Value;

use polybridge_cache::CacheRegistry;
use polybridge_core::{BridgeError, ResultData, TokenUsage, ToolCallEvent};
use polybridge_translate::{ReplayPolicy, SystemPromptMode, TranslationOptions};

use crate::client::BackendClient;

/// Ambient references handed to every hook invocation.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    /// The shared metadata cache.
    pub cache: &'a CacheRegistry,
    /// Key identifying the host conversation across turns.
    pub conversation_id: &'a str,
    /// The model slug being served.
    pub model_slug: &'a str,
}

/// One provider family's binding: declarative capabilities plus hook
/// overrides, composed around a handle to that provider's SDK client.
pub trait BackendVariant: Send + Sync {
    /// Provider key this variant serves.
    fn provider_key(&self) -> &str;

    /// The SDK client to stream through.
    ///
    /// A routing variant has no client of its own and reports a
    /// configuration error here; callers resolve a model slug first.
    fn client(&self) -> Result<Arc<dyn BackendClient>, BridgeError>;

    /// How this backend accepts system instructions.
    fn system_prompt_mode(&self) -> SystemPromptMode {
        SystemPromptMode::Native
    }

    /// Lifetime of cached reasoning continuation state for this backend.
    fn reasoning_replay(&self) -> ReplayPolicy {
        ReplayPolicy::Persistent
    }

    /// Translation options derived from the declared capabilities.
    fn translation_options(&self) -> TranslationOptions {
        TranslationOptions {
            system_mode: self.system_prompt_mode(),
            reasoning_replay: self.reasoning_replay(),
        }
    }

    /// Produce the provider-options object for one request.
    fn provider_options(&self, _ctx: &HookContext<'_>) -> Option<Value> {
        None
    }

    /// Observe a streamed tool call, typically to capture an opaque
    /// continuation token into the metadata cache.
    fn process_tool_call_metadata(&self, _event: &ToolCallEvent, _ctx: &HookContext<'_>) {}

    /// Observe a reasoning delta, for backends that must replay full
    /// reasoning text on the next request.
    fn process_reasoning_delta(&self, _id: Option<&str>, _text: &str, _ctx: &HookContext<'_>) {}

    /// Observe the finished response metadata, e.g. to record a response
    /// identifier for cheap continuation on the next turn.
    fn process_response_metadata(&self, _result: &ResultData, _ctx: &HookContext<'_>) {}

    /// Shape the raw usage payload into token counts. Override when the
    /// provider's usage shape diverges from the default.
    fn process_result_data(&self, result: &ResultData) -> TokenUsage {
        default_usage(result)
    }

    /// Resolve the variant actually serving this model slug.
    ///
    /// Plain variants return themselves; a routing variant picks an inner
    /// variant per request based on the slug's provider prefix.
    fn resolve(&self, model_slug: &str) -> Result<&dyn BackendVariant, BridgeError>;
}

/// Default usage extraction: the common `input_tokens`/`output_tokens`
/// shape with optional cache counters.
#[must_use]
pub fn default_usage(result: &ResultData) -> TokenUsage {
    let Some(usage) = &result.usage else {
        return TokenUsage::new();
    };
    TokenUsage {
        input_tokens: usage.get("input_tokens").and_then(Value::as_u64),
        output_tokens: usage.get("output_tokens").and_then(Value::as_u64),
        total_tokens: usage.get("total_tokens").and_then(Value::as_u64),
        cache_read_tokens: usage.get("cache_read_tokens").and_then(Value::as_u64),
        cache_write_tokens: usage.get("cache_write_tokens").and_then(Value::as_u64),
    }
}
