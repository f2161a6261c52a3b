//! Gemini-family backend variant.
//!
//! System instructions travel in the dedicated `systemInstruction`
//! parameter, and the usage payload uses camel-cased count fields.

use std::sync::Arc;

use serde_json::Value;

use polybridge_core::{BridgeError, ResultData, TokenUsage};
use polybridge_translate::SystemPromptMode;

use crate::client::BackendClient;
use crate::variant::BackendVariant;

/// Variant binding for Gemini-compatible backends.
pub struct GeminiVariant {
    client: Arc<dyn BackendClient>,
}

impl GeminiVariant {
    /// Create the variant around an SDK client.
    #[must_use]
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }
}

impl BackendVariant for GeminiVariant {
    fn provider_key(&self) -> &str {
        "gemini"
    }

    fn client(&self) -> Result<Arc<dyn BackendClient>, BridgeError> {
        Ok(self.client.clone())
    }

    fn system_prompt_mode(&self) -> SystemPromptMode {
        SystemPromptMode::Parameter
    }

    fn process_result_data(&self, result: &ResultData) -> TokenUsage {
        let Some(usage) = &result.usage else {
            return TokenUsage::new();
        };
        TokenUsage {
            input_tokens: usage.get("promptTokenCount").and_then(Value::as_u64),
            output_tokens: usage.get("candidatesTokenCount").and_then(Value::as_u64),
            total_tokens: usage.get("totalTokenCount").and_then(Value::as_u64),
            cache_read_tokens: usage
                .get("cachedContentTokenCount")
                .and_then(Value::as_u64),
            cache_write_tokens: None,
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
    use serde_json::json;

    #[test]
    fn test_usage_shape() {
        let variant = GeminiVariant::new(Arc::new(ScriptedBackend::new("gemini")));
        let result = ResultData::new().with_usage(json!({
            "promptTokenCount": 7,
            "candidatesTokenCount": 3,
            "totalTokenCount": 10
        }));
        let usage = variant.process_result_data(&result);
        assert_eq!(usage.input_tokens, Some(7));
        assert_eq!(usage.output_tokens, Some(3));
        assert_eq!(usage.total(), Some(10));
    }

    #[test]
    fn test_system_mode() {
        let variant = GeminiVariant::new(Arc::new(ScriptedBackend::new("gemini")));
        assert_eq!(variant.system_prompt_mode(), SystemPromptMode::Parameter);
    }
}
