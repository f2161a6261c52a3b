//! Per-exchange ephemeral state.

use std::time::Instant;

use polybridge_backends::ProviderRequest;

use crate::accumulator::ResponseAccumulator;

/// Lifecycle state of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// Nothing has happened yet.
    Idle,
    /// Translating and resolving configuration.
    SettingUp,
    /// Streaming parts from the backend.
    Streaming,
    /// Computing usage and committing the audit record.
    Finalizing,
    /// Finished successfully.
    Done,
    /// Terminated with an error; feeds the retry envelope.
    Failed,
}

/// Ephemeral record scoped to one exchange attempt.
///
/// Created at setup, mutated during execution, discarded after finalize.
/// A retried attempt builds a fresh context; nothing here is reused.
#[derive(Debug)]
pub struct RequestContext {
    /// The fully translated provider request.
    pub request: ProviderRequest,
    /// Audit correlation id opened at setup.
    pub audit_id: String,
    /// Accumulates delivered parts for the audit record.
    pub accumulator: ResponseAccumulator,
    /// Start timestamp for duration and throughput.
    pub started_at: Instant,
}

impl RequestContext {
    /// Create a context around a translated request.
    #[must_use]
    pub fn new(request: ProviderRequest, audit_id: String) -> Self {
        Self {
            request,
            audit_id,
            accumulator: ResponseAccumulator::new(),
            started_at: Instant::now(),
        }
    }
}
