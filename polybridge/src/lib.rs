//! # polybridge
//!
//! polybridge sits between a host chat interface and a set of heterogeneous
//! model-serving backends and makes many backends look like one: it
//! translates conversation history in both directions, normalizes tool
//! definitions and tool-call payloads, streams incremental output back to
//! the host in order, and carries provider-specific continuation state
//! across turns even though the host retains none itself.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use polybridge::prelude::*;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let bridge = Bridge::new();
//! let backend = ScriptedBackend::new("openai")
//!     .with_turn(ScriptedTurn::new().text_deltas(&["Hello!"]));
//! let variant = OpenAiVariant::new(Arc::new(backend));
//! let model = ModelConfig::new("gpt-4o", "openai");
//! let sink = CollectingSink::new();
//!
//! let snapshot = bridge
//!     .chat(
//!         &variant,
//!         &model,
//!         "conversation-1",
//!         &[ChatMessage::user("Hi")],
//!         &[],
//!         &sink,
//!         &CancellationToken::new(),
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(snapshot.text_content(), "Hello!");
//! # });
//! ```
//!
//! ## Architecture
//!
//! polybridge is a workspace of focused crates:
//!
//! - [`polybridge_core`] - conversation vocabulary, tools, usage, errors
//! - [`polybridge_translate`] - host↔provider translation and normalization
//! - [`polybridge_cache`] - bounded cross-turn metadata cache
//! - [`polybridge_backends`] - per-provider variant strategy objects
//! - [`polybridge_exchange`] - streaming orchestration, retries, audit log

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod bridge;

pub use bridge::Bridge;

/// Core conversation vocabulary.
pub use polybridge_core as core;

/// Host↔provider translation.
pub use polybridge_translate as translate;

/// Cross-turn metadata cache.
pub use polybridge_cache as cache;

/// Backend variant bindings.
pub use polybridge_backends as backends;

/// Orchestration, retries, and the audit log.
pub use polybridge_exchange as exchange;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::bridge::Bridge;
    pub use polybridge_backends::{
        AnthropicVariant, BackendClient, BackendVariant, GatewayVariant, GeminiVariant,
        OpenAiVariant, ProviderSettings, ScriptedBackend, ScriptedTurn,
    };
    pub use polybridge_cache::CacheRegistry;
    pub use polybridge_core::{
        BridgeError, ChatMessage, ContentPart, Role, SamplingParams, StreamingPart, TokenUsage,
        ToolDefinition,
    };
    pub use polybridge_exchange::{
        run_exchange, AuditLog, CollectingSink, ExchangeServices, HostSink, MemorySecretStore,
        ModelConfig, NullStatus, SecretStore, StatusReporter,
    };
    pub use polybridge_translate::{
        stringify_result, to_host, to_provider, tools_to_provider, TranslationOptions,
    };
}
