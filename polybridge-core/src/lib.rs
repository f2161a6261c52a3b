//! # polybridge-core
//!
//! Core conversation vocabulary for the polybridge host↔backend bridge:
//!
//! - **Messages**: role-tagged conversation messages and their content parts
//! - **Streaming**: the incremental part vocabulary backends emit
//! - **Tools**: tool definitions with host-contract name validation
//! - **Usage**: token usage accounting
//! - **Settings**: pass-through sampling parameters
//! - **Errors**: the bridge-wide error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use polybridge_core::{ChatMessage, SamplingParams, ToolDefinition};
//!
//! let history = vec![
//!     ChatMessage::system("You are a helpful assistant."),
//!     ChatMessage::user("What's the weather in NYC?"),
//! ];
//!
//! let tool = ToolDefinition::new("get_weather", "Look up current weather")
//!     .with_schema(serde_json::json!({
//!         "type": "object",
//!         "properties": {"location": {"type": "string"}}
//!     }));
//! assert!(tool.validate().is_ok());
//!
//! let params = SamplingParams::new().max_tokens(4096);
//! assert!(params.temperature.is_none());
//! # let _ = (history, params);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod messages;
pub mod settings;
pub mod streaming;
pub mod tool;
pub mod usage;

pub use error::{BridgeError, Result};
pub use messages::{
    verify_tool_pairing, ChatMessage, ContentPart, DataContent, Role, TextContent,
    ThinkingContent, ToolCallContent, ToolResultContent,
};
pub use settings::SamplingParams;
pub use streaming::{BackendEvent, ResultData, StreamingPart, ToolCallEvent};
pub use tool::{empty_object_schema, validate_tool_name, ToolDefinition};
pub use usage::TokenUsage;
