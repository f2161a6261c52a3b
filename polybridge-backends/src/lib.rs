//! # polybridge-backends
//!
//! One concrete binding per upstream provider family. Each variant is a
//! capability-keyed strategy object: declarative capabilities the translator
//! consumes (system-prompt mode, reasoning replay lifetime) plus hook
//! overrides the orchestrator invokes (provider options, tool-call metadata
//! capture, reasoning capture, response metadata, usage shaping).
//!
//! The wire protocol itself lives behind the [`BackendClient`] trait - the
//! provider SDK collaborator boundary. [`ScriptedBackend`] is the in-tree
//! client used by tests.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use polybridge_backends::{BackendVariant, GatewayVariant, OpenAiVariant, ScriptedBackend};
//!
//! let gateway = GatewayVariant::new()
//!     .with_variant(Arc::new(OpenAiVariant::new(Arc::new(ScriptedBackend::new("openai")))));
//! let variant = gateway.resolve("openai:gpt-4o").unwrap();
//! assert_eq!(variant.provider_key(), "openai");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod anthropic;
pub mod client;
pub mod gateway;
pub mod gemini;
pub mod handle;
pub mod openai;
pub mod scripted;
pub mod variant;

pub use anthropic::AnthropicVariant;
pub use client::{BackendClient, BackendStream, ProviderRequest, DEFAULT_SDK_RETRIES};
pub use gateway::GatewayVariant;
pub use gemini::GeminiVariant;
pub use handle::{BackendHandle, HandleRegistry, ProviderSettings};
pub use openai::OpenAiVariant;
pub use scripted::{ScriptedBackend, ScriptedTurn};
pub use variant::{default_usage, BackendVariant, HookContext};
