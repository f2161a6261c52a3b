//! Anthropic-family backend variant.
//!
//! System instructions go through the dedicated system parameter. Thinking
//! signatures must be replayed verbatim on every later turn, so the
//! reasoning namespace is read without deletion. Cache breakpoints are
//! requested through provider options.

use std::sync::Arc;

use serde_json::{json, Value};

use polybridge_cache::NS_PENDING_REASONING;
use polybridge_core::{BridgeError, ResultData, TokenUsage};
use polybridge_translate::{ReplayPolicy, SystemPromptMode};

use crate::client::BackendClient;
use crate::variant::{BackendVariant, HookContext};

/// Variant binding for Anthropic-compatible backends.
pub struct AnthropicVariant {
    client: Arc<dyn BackendClient>,
    enable_caching: bool,
}

impl AnthropicVariant {
    /// Create the variant around an SDK client.
    #[must_use]
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self {
            client,
            enable_caching: true,
        }
    }

    /// Disable prompt-cache breakpoints.
    #[must_use]
    pub fn without_caching(mut self) -> Self {
        self.enable_caching = false;
        self
    }
}

impl BackendVariant for AnthropicVariant {
    fn provider_key(&self) -> &str {
        "anthropic"
    }

    fn client(&self) -> Result<Arc<dyn BackendClient>, BridgeError> {
        Ok(self.client.clone())
    }

    fn system_prompt_mode(&self) -> SystemPromptMode {
        SystemPromptMode::Parameter
    }

    fn reasoning_replay(&self) -> ReplayPolicy {
        ReplayPolicy::Persistent
    }

    fn provider_options(&self, _ctx: &HookContext<'_>) -> Option<Value> {
        if !self.enable_caching {
            return None;
        }
        Some(json!({ "cache_control": { "type": "ephemeral" } }))
    }

    fn process_reasoning_delta(&self, id: Option<&str>, text: &str, ctx: &HookContext<'_>) {
        // Signed thinking blocks are keyed by their signature id; unkeyed
        // deltas carry no continuation obligation.
        let Some(id) = id else { return };
        let mut pending = ctx
            .cache
            .get(NS_PENDING_REASONING, id)
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        pending.push_str(text);
        ctx.cache
            .set(NS_PENDING_REASONING, id, Value::String(pending));
    }

    fn process_result_data(&self, result: &ResultData) -> TokenUsage {
        let Some(usage) = &result.usage else {
            return TokenUsage::new();
        };
        let input = usage.get("input_tokens").and_then(Value::as_u64);
        let output = usage.get("output_tokens").and_then(Value::as_u64);
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
            total_tokens: match (input, output) {
                (Some(i), Some(o)) => Some(i + o),
                _ => None,
            },
            cache_read_tokens: usage.get("cache_read_input_tokens").and_then(Value::as_u64),
            cache_write_tokens: usage
                .get("cache_creation_input_tokens")
                .and_then(Value::as_u64),
        }
    }

    fn resolve(&self, _model_slug: &str) -> Result<&dyn BackendVariant, BridgeError> {
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedBackend;
    use polybridge_cache::CacheRegistry;

    fn variant() -> AnthropicVariant {
        AnthropicVariant::new(Arc::new(ScriptedBackend::new("anthropic")))
    }

    #[test]
    fn test_system_goes_through_parameter() {
        assert_eq!(
            variant().system_prompt_mode(),
            SystemPromptMode::Parameter
        );
        assert_eq!(variant().reasoning_replay(), ReplayPolicy::Persistent);
    }

    #[test]
    fn test_cache_breakpoint_options() {
        let cache = CacheRegistry::new();
        let ctx = HookContext {
            cache: &cache,
            conversation_id: "conv-1",
            model_slug: "claude-sonnet-4",
        };
        assert!(variant().provider_options(&ctx).is_some());
        assert!(variant().without_caching().provider_options(&ctx).is_none());
    }

    #[test]
    fn test_signed_reasoning_recorded() {
        let cache = CacheRegistry::new();
        let ctx = HookContext {
            cache: &cache,
            conversation_id: "conv-1",
            model_slug: "claude-sonnet-4",
        };
        let v = variant();
        v.process_reasoning_delta(Some("sig_1"), "step one. ", &ctx);
        v.process_reasoning_delta(Some("sig_1"), "step two.", &ctx);
        v.process_reasoning_delta(None, "unsigned", &ctx);

        assert_eq!(
            cache.get(NS_PENDING_REASONING, "sig_1"),
            Some(json!("step one. step two."))
        );
        assert_eq!(cache.len(NS_PENDING_REASONING), 1);
    }

    #[test]
    fn test_usage_shape() {
        let result = ResultData::new().with_usage(json!({
            "input_tokens": 50,
            "output_tokens": 10,
            "cache_read_input_tokens": 40,
            "cache_creation_input_tokens": 5
        }));
        let usage = variant().process_result_data(&result);
        assert_eq!(usage.total(), Some(60));
        assert_eq!(usage.cache_read_tokens, Some(40));
        assert_eq!(usage.cache_write_tokens, Some(5));
    }
}
