//! Routing meta-variant.
//!
//! One "gateway" provider configuration can front several real provider
//! families. The gateway variant holds the inner strategy objects and picks
//! one per request from the model slug's provider prefix
//! (`"anthropic:claude-sonnet-4"` routes to the `anthropic` inner variant).
//! Composition is by delegation: the resolved inner variant serves every
//! hook for that request.

use std::sync::Arc;

use indexmap::IndexMap;

use polybridge_core::BridgeError;

use crate::client::BackendClient;
use crate::variant::BackendVariant;

/// A variant that routes each request to one of several inner variants.
#[derive(Default)]
pub struct GatewayVariant {
    inner: IndexMap<String, Arc<dyn BackendVariant>>,
}

impl GatewayVariant {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inner variant under its own provider key.
    #[must_use]
    pub fn with_variant(mut self, variant: Arc<dyn BackendVariant>) -> Self {
        self.inner
            .insert(variant.provider_key().to_string(), variant);
        self
    }

    /// Provider keys of the registered inner variants.
    #[must_use]
    pub fn inner_keys(&self) -> Vec<&str> {
        self.inner.keys().map(String::as_str).collect()
    }

    fn route(&self, model_slug: &str) -> Result<&Arc<dyn BackendVariant>, BridgeError> {
        let Some((prefix, rest)) = model_slug.split_once(':') else {
            return Err(BridgeError::configuration(format!(
                "gateway model slug '{model_slug}' is missing a 'provider:' prefix"
            )));
        };
        if rest.is_empty() {
            return Err(BridgeError::configuration(format!(
                "gateway model slug '{model_slug}' has an empty model name"
            )));
        }
        self.inner.get(prefix).ok_or_else(|| {
            BridgeError::configuration(format!(
                "gateway has no inner variant for provider '{prefix}'"
            ))
        })
    }
}

impl BackendVariant for GatewayVariant {
    fn provider_key(&self) -> &str {
        "gateway"
    }

    fn client(&self) -> Result<Arc<dyn BackendClient>, BridgeError> {
        Err(BridgeError::configuration(
            "gateway variant has no client of its own; resolve a model slug first",
        ))
    }

    fn resolve(&self, model_slug: &str) -> Result<&dyn BackendVariant, BridgeError> {
        self.route(model_slug).map(|v| v.as_ref())
    }
}
