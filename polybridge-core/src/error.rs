//! Error taxonomy for the bridge.
//!
//! Errors are classified by where they are allowed to surface: configuration
//! errors fail fast and are never retried, backend errors feed the retry
//! envelope, translation and cache errors are recoverable and mostly resolved
//! locally, and an aborted exchange is not a failure at all.

use thiserror::Error;

/// The error type shared across the bridge crates.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Missing or invalid credentials, base URL, or model identity.
    /// Fails fast before any network call; never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport or backend error raised during streaming.
    /// Retried by the envelope up to the configured bound.
    #[error("backend error: {message}")]
    Backend {
        /// Underlying message from the provider SDK.
        message: String,
        /// HTTP status, when the SDK surfaced one.
        status: Option<u16>,
    },

    /// Malformed tool schema, unparseable arguments, or an invalid history.
    /// Must not crash the exchange.
    #[error("translation error: {0}")]
    Translation(String),

    /// Cache or persistence failure; degrades to in-memory operation.
    #[error("cache error: {0}")]
    Cache(String),

    /// The host cancelled the exchange. Not a failure; never retried.
    #[error("exchange aborted by host")]
    Aborted,
}

impl BridgeError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            status: None,
        }
    }

    /// Create a backend error with an HTTP status.
    #[must_use]
    pub fn backend_status(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a translation error.
    #[must_use]
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    /// Create a cache error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Whether the retry envelope may re-attempt the exchange after this
    /// error. Only backend/transport failures qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Whether this represents host-driven cancellation.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Result alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;
