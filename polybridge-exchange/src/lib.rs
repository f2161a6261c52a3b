//! # polybridge-exchange
//!
//! The provider-agnostic half of the bridge: the three-phase streaming
//! orchestrator every backend variant shares, the retry envelope around a
//! full exchange, the bounded audit log, and the collaborator interfaces
//! toward the host (progress sink, cancellation), configuration, secret
//! storage, and status display.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use polybridge_backends::{OpenAiVariant, ScriptedBackend, ScriptedTurn};
//! use polybridge_cache::CacheRegistry;
//! use polybridge_core::ChatMessage;
//! use polybridge_exchange::{
//!     run_exchange, AuditLog, CollectingSink, ExchangeServices, ModelConfig, NullStatus,
//! };
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! # rt.block_on(async {
//! let backend = ScriptedBackend::new("openai")
//!     .with_turn(ScriptedTurn::new().text_deltas(&["Hello"]));
//! let variant = OpenAiVariant::new(Arc::new(backend));
//! let model = ModelConfig::new("gpt-4o", "openai");
//! let cache = CacheRegistry::new();
//! let audit = AuditLog::new();
//! let sink = CollectingSink::new();
//!
//! let services = ExchangeServices { cache: &cache, audit: &audit, status: &NullStatus };
//! let snapshot = run_exchange(
//!     &variant, &model, "conv-1",
//!     &[ChatMessage::user("Hi")], &[],
//!     services, &sink, &CancellationToken::new(),
//! ).await.unwrap();
//! assert_eq!(snapshot.text_content(), "Hello");
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod audit;
pub mod config;
pub mod context;
pub mod orchestrator;
pub mod retry;
pub mod secrets;
pub mod sink;

pub use accumulator::ResponseAccumulator;
pub use audit::{
    AuditLog, ExchangeRecord, RequestSnapshot, ResponseSnapshot, DEFAULT_AUDIT_CAPACITY,
};
pub use config::{ModelConfig, DEFAULT_MAX_ATTEMPTS};
pub use context::{ExchangePhase, RequestContext};
pub use orchestrator::{Exchange, ExchangeServices};
pub use retry::run_exchange;
pub use secrets::{secret_key, MemorySecretStore, SecretStore, SECRET_NAMESPACE};
pub use sink::{CollectingSink, HostSink, NullStatus, RecordingStatus, StatusReporter};
