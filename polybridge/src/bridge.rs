//! The bridge service object.
//!
//! Bundles the process-wide shared state (metadata cache, audit log, backend
//! handle registry) behind an explicit init/teardown lifecycle: restore the
//! persisted cache namespaces at construction, flush them at shutdown.
//! Nothing here is a language-level singleton; tests construct isolated
//! instances.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use std::sync::Arc;

use polybridge_backends::{BackendHandle, BackendVariant, HandleRegistry, ProviderSettings};
use polybridge_cache::CacheRegistry;
use polybridge_core::{BridgeError, ChatMessage, ToolDefinition};
use polybridge_exchange::{
    run_exchange, secret_key, AuditLog, ExchangeServices, HostSink, ModelConfig, NullStatus,
    ResponseSnapshot, SecretStore, StatusReporter,
};

/// Shared state for one embedded bridge instance.
#[derive(Debug)]
pub struct Bridge {
    cache: CacheRegistry,
    audit: AuditLog,
    handles: HandleRegistry,
    storage_dir: Option<PathBuf>,
}

impl Bridge {
    /// Create an in-memory bridge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: CacheRegistry::new(),
            audit: AuditLog::new(),
            handles: HandleRegistry::new(),
            storage_dir: None,
        }
    }

    /// Create a bridge with durable cache storage, restoring any namespaces
    /// persisted by an earlier run.
    #[must_use]
    pub fn with_storage_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let bridge = Self {
            cache: CacheRegistry::new(),
            audit: AuditLog::new(),
            handles: HandleRegistry::new(),
            storage_dir: Some(dir.clone()),
        };
        let restored = polybridge_cache::restore(&bridge.cache, &dir);
        debug!(restored, dir = %dir.display(), "bridge cache restored");
        bridge
    }

    /// The metadata cache registry.
    #[must_use]
    pub fn cache(&self) -> &CacheRegistry {
        &self.cache
    }

    /// The audit log.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The backend handle registry.
    #[must_use]
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Resolve the credential for a provider and build (or reuse) its
    /// backend handle.
    pub fn backend_handle(
        &self,
        provider_key: &str,
        settings: &ProviderSettings,
        secrets: &dyn SecretStore,
    ) -> Result<Arc<BackendHandle>, BridgeError> {
        let api_key = secrets.get(&secret_key(provider_key));
        self.handles
            .handle_for(provider_key, settings, api_key.as_deref())
    }

    /// Assemble the per-exchange service bundle.
    #[must_use]
    pub fn services<'a>(&'a self, status: &'a dyn StatusReporter) -> ExchangeServices<'a> {
        ExchangeServices {
            cache: &self.cache,
            audit: &self.audit,
            status,
        }
    }

    /// Run one host chat call through the retry envelope.
    #[allow(clippy::too_many_arguments)]
    pub async fn chat(
        &self,
        variant: &dyn BackendVariant,
        model: &ModelConfig,
        conversation_id: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        sink: &dyn HostSink,
        cancel: &CancellationToken,
    ) -> Result<ResponseSnapshot, BridgeError> {
        run_exchange(
            variant,
            model,
            conversation_id,
            messages,
            tools,
            self.services(&NullStatus),
            sink,
            cancel,
        )
        .await
    }

    /// Flush persistent cache namespaces. Called at process teardown;
    /// safe to call repeatedly.
    pub fn shutdown(&self) {
        if let Some(dir) = &self.storage_dir {
            let flushed = polybridge_cache::flush(&self.cache, dir);
            debug!(flushed, dir = %dir.display(), "bridge cache flushed");
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
