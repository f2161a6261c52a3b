//! The provider-SDK collaborator boundary.
//!
//! polybridge never implements a backend's wire protocol; it hands a fully
//! translated request to an SDK client and consumes the event stream the
//! client produces.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

use polybridge_core::{BackendEvent, BridgeError, SamplingParams};
use polybridge_translate::{ProviderMessage, ProviderTool};

/// Transport-level retry count handed to the SDK, distinct from the
/// exchange-level retry envelope.
pub const DEFAULT_SDK_RETRIES: u32 = 3;

/// A fully translated request ready for an SDK client.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Provider-format messages.
    pub messages: Vec<ProviderMessage>,
    /// System text for backends using a dedicated parameter.
    pub system: Option<String>,
    /// Provider-format tool definitions.
    pub tools: Vec<ProviderTool>,
    /// Pass-through sampling parameters; unset fields stay unset.
    pub sampling: SamplingParams,
    /// Provider-specific options produced by the variant hook.
    pub provider_options: Option<Value>,
    /// SDK-internal transport retry bound.
    pub sdk_max_retries: u32,
}

impl ProviderRequest {
    /// Create a request from messages alone.
    #[must_use]
    pub fn new(messages: Vec<ProviderMessage>) -> Self {
        Self {
            messages,
            system: None,
            tools: Vec::new(),
            sampling: SamplingParams::default(),
            provider_options: None,
            sdk_max_retries: DEFAULT_SDK_RETRIES,
        }
    }

    /// Set the system parameter.
    #[must_use]
    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    /// Set the tool definitions.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ProviderTool>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the sampling parameters.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the provider options.
    #[must_use]
    pub fn with_provider_options(mut self, options: Option<Value>) -> Self {
        self.provider_options = options;
        self
    }
}

/// Boxed stream of backend events.
pub type BackendStream = Pin<Box<dyn Stream<Item = Result<BackendEvent, BridgeError>> + Send>>;

/// A provider SDK client.
///
/// Implementations own the wire protocol; the bridge only requires that
/// events come back in generation order and that the stream terminates with
/// a `Finish` event when the backend completes normally.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Provider key this client serves (e.g. "openai").
    fn provider_key(&self) -> &str;

    /// Open a streaming chat exchange.
    async fn stream_chat(&self, request: ProviderRequest) -> Result<BackendStream, BridgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ProviderRequest::new(vec![ProviderMessage::user_text("Hi")])
            .with_system(Some("Be helpful.".into()))
            .with_sampling(SamplingParams::new().max_tokens(100));

        assert_eq!(request.system.as_deref(), Some("Be helpful."));
        assert_eq!(request.sampling.max_tokens, Some(100));
        assert_eq!(request.sdk_max_retries, DEFAULT_SDK_RETRIES);
        assert!(request.sampling.temperature.is_none());
    }
}
