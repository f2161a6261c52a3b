//! Memoized backend handles.
//!
//! A handle bundles everything a provider SDK collaborator needs to talk to
//! one configured backend: a built HTTP client, default headers, base URL,
//! and the resolved credential. Handles are keyed by provider + configuration
//! identity, built once, and reused across exchanges; they are stateless and
//! need no cleanup beyond process exit.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;

use polybridge_core::BridgeError;

/// Per-provider identity from the configuration collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Base URL of the provider endpoint.
    pub base_url: String,
    /// Extra default headers.
    pub headers: Vec<(String, String)>,
    /// Arbitrary provider-specific options blob, passed through opaquely.
    pub options: Value,
}

impl ProviderSettings {
    /// Create settings for a base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
            options: Value::Null,
        }
    }

    /// Add a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the provider-specific options blob.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// A configured, reusable binding to one backend endpoint.
#[derive(Debug, Clone)]
pub struct BackendHandle {
    /// Provider key this handle serves.
    pub provider_key: String,
    /// Endpoint base URL.
    pub base_url: String,
    /// HTTP client for the SDK collaborator.
    pub http: Client,
    /// Default headers, credential included.
    pub headers: HeaderMap,
    /// The resolved API key, when one is configured.
    pub api_key: Option<String>,
    /// Provider-specific options blob.
    pub options: Value,
}

/// Registry memoizing handles by provider + configuration identity.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: RwLock<HashMap<String, Arc<BackendHandle>>>,
}

impl HandleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or build the handle for a provider configuration.
    ///
    /// Configuration problems (malformed base URL, unparseable header) fail
    /// fast here, before any network activity.
    pub fn handle_for(
        &self,
        provider_key: &str,
        settings: &ProviderSettings,
        api_key: Option<&str>,
    ) -> Result<Arc<BackendHandle>, BridgeError> {
        let identity = identity_key(provider_key, settings, api_key);

        if let Some(handle) = self.handles.read().get(&identity) {
            return Ok(handle.clone());
        }

        let handle = Arc::new(build_handle(provider_key, settings, api_key)?);
        self.handles
            .write()
            .entry(identity)
            .or_insert_with(|| handle.clone());
        Ok(handle)
    }

    /// Number of memoized handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    /// Check if no handles have been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }
}

fn identity_key(provider_key: &str, settings: &ProviderSettings, api_key: Option<&str>) -> String {
    let mut key = format!("{provider_key}\n{}\n{}", settings.base_url, api_key.unwrap_or(""));
    for (name, value) in &settings.headers {
        key.push('\n');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

fn build_handle(
    provider_key: &str,
    settings: &ProviderSettings,
    api_key: Option<&str>,
) -> Result<BackendHandle, BridgeError> {
    if !settings.base_url.starts_with("http://") && !settings.base_url.starts_with("https://") {
        return Err(BridgeError::configuration(format!(
            "provider '{provider_key}' has an invalid base URL '{}'",
            settings.base_url
        )));
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &settings.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            BridgeError::configuration(format!(
                "provider '{provider_key}' has an invalid header name '{name}'"
            ))
        })?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            BridgeError::configuration(format!(
                "provider '{provider_key}' has an invalid value for header '{name:?}'"
            ))
        })?;
        headers.insert(name, value);
    }
    if let Some(key) = api_key {
        let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| {
            BridgeError::configuration(format!(
                "provider '{provider_key}' has a credential not representable as a header"
            ))
        })?;
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }

    let http = Client::builder()
        .default_headers(headers.clone())
        .build()
        .map_err(|err| {
            BridgeError::configuration(format!(
                "provider '{provider_key}' HTTP client construction failed: {err}"
            ))
        })?;

    Ok(BackendHandle {
        provider_key: provider_key.to_string(),
        base_url: settings.base_url.clone(),
        http,
        headers,
        api_key: api_key.map(str::to_owned),
        options: settings.options.clone(),
    })
}
