//! # polybridge-cache
//!
//! Bounded, named key/value stores holding opaque per-turn continuation
//! data: tool-call side-channel tokens, pending reasoning text, the last
//! provider response identifier.
//!
//! - FIFO eviction at a per-namespace capacity
//! - dirty tracking for persistence bookkeeping
//! - opt-in durable persistence with an index of persisted namespace names
//!
//! Ownership convention: a backend variant writes continuation state after
//! observing provider metadata; the content translator reads it on the next
//! outbound translation. Single-use entries are deleted by the *reader*
//! immediately after being folded into a message, not by the writer.
//!
//! ## Example
//!
//! ```rust
//! use polybridge_cache::{CacheRegistry, NS_TOOL_TOKENS};
//!
//! let registry = CacheRegistry::new();
//! registry.set(NS_TOOL_TOKENS, "call_1", serde_json::json!("opaque-token"));
//! assert!(registry.has(NS_TOOL_TOKENS, "call_1"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod namespace;
pub mod persist;
pub mod registry;

pub use namespace::{MetadataCache, SerializedNamespace, DEFAULT_CAPACITY};
pub use persist::{flush, restore};
pub use registry::{CacheRegistry, NS_LAST_RESPONSE, NS_PENDING_REASONING, NS_TOOL_TOKENS};
