//! Per-model identity from the configuration collaborator.

use serde::{Deserialize, Serialize};

use polybridge_core::SamplingParams;

/// Default bound on full exchange attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Identity and parameters of one configured model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model slug resolved against the backend (for a gateway configuration,
    /// prefixed `provider:model`).
    pub slug: String,
    /// Provider key selecting the backend variant.
    pub provider_key: String,
    /// Display name for UI surfaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Pass-through sampling parameters; unset fields stay unset.
    #[serde(default)]
    pub sampling: SamplingParams,
    /// Bound on full exchange attempts for the retry envelope.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Context window size, used for status display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl ModelConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new(slug: impl Into<String>, provider_key: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            provider_key: provider_key.into(),
            display_name: None,
            sampling: SamplingParams::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            context_window: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the sampling parameters.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the attempt bound.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the context window.
    #[must_use]
    pub fn with_context_window(mut self, tokens: u64) -> Self {
        self.context_window = Some(tokens);
        self
    }
}
