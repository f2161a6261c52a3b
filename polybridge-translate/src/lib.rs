//! # polybridge-translate
//!
//! The bidirectional content translator between the host conversation format
//! and the provider format consumed by backend SDKs, plus the tool-call
//! normalizer that repairs over-parsed inputs and collapses heterogeneous
//! tool outputs to canonical text.
//!
//! Translation is pure and stateless apart from one explicit side channel:
//! continuation state (tool-call tokens, pending reasoning text) is read
//! from the metadata cache keyed by the identifiers threading through the
//! conversation itself.
//!
//! ## Example
//!
//! ```rust
//! use polybridge_cache::CacheRegistry;
//! use polybridge_core::ChatMessage;
//! use polybridge_translate::{to_provider, TranslationOptions};
//!
//! let cache = CacheRegistry::new();
//! let history = vec![ChatMessage::user("Hi")];
//! let translated = to_provider(&history, &TranslationOptions::default(), &cache).unwrap();
//! assert_eq!(translated.messages[0].as_text(), Some("Hi"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod normalize;
pub mod provider;
pub mod translator;

pub use normalize::{normalize_input, stringify_result};
pub use provider::{ProviderContent, ProviderMessage, ProviderPart, ProviderRole, ProviderTool};
pub use translator::{
    to_host, to_provider, tools_to_provider, ReplayPolicy, SystemPromptMode,
    TranslatedConversation, TranslationOptions,
};
