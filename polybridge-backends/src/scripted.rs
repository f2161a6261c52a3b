//! Scripted backend client for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;

use polybridge_core::{BackendEvent, BridgeError, ResultData, StreamingPart};

use crate::client::{BackendClient, BackendStream, ProviderRequest};

/// One scripted exchange: a sequence of events, optionally followed by a
/// mid-stream error after the events have been delivered.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    /// Events to yield, in order.
    pub events: Vec<BackendEvent>,
    /// Error message to raise after the events, if any.
    pub error_after: Option<String>,
}

impl ScriptedTurn {
    /// Create an empty turn.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a streaming part.
    #[must_use]
    pub fn part(mut self, part: StreamingPart) -> Self {
        self.events.push(BackendEvent::Part(part));
        self
    }

    /// Append text deltas.
    #[must_use]
    pub fn text_deltas(mut self, deltas: &[&str]) -> Self {
        for delta in deltas {
            self.events
                .push(BackendEvent::Part(StreamingPart::text(*delta)));
        }
        self
    }

    /// Finish normally with the given result data.
    #[must_use]
    pub fn finish(mut self, result: ResultData) -> Self {
        self.events.push(BackendEvent::Finish(result));
        self
    }

    /// Raise an error after delivering the scripted events.
    #[must_use]
    pub fn then_error(mut self, message: impl Into<String>) -> Self {
        self.error_after = Some(message.into());
        self
    }
}

/// A backend client that plays back scripted turns and records requests.
///
/// Turns are consumed in order; a client with no remaining turns yields an
/// empty successful stream. Calls can be made to fail outright before any
/// stream is produced, to exercise the retry envelope.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    provider_key: String,
    turns: Arc<Mutex<VecDeque<ScriptedTurn>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
    failures_remaining: Arc<Mutex<Option<u32>>>,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedBackend {
    /// Create a scripted backend for the given provider key.
    #[must_use]
    pub fn new(provider_key: impl Into<String>) -> Self {
        Self {
            provider_key: provider_key.into(),
            turns: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            failures_remaining: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a scripted turn.
    #[must_use]
    pub fn with_turn(self, turn: ScriptedTurn) -> Self {
        self.turns.lock().push_back(turn);
        self
    }

    /// Fail the next `count` calls with a backend error before streaming.
    #[must_use]
    pub fn with_initial_failures(self, count: u32) -> Self {
        *self.failures_remaining.lock() = Some(count);
        self
    }

    /// Fail every call.
    #[must_use]
    pub fn always_failing(self) -> Self {
        *self.failures_remaining.lock() = Some(u32::MAX);
        self
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> u32 {
        *self.calls.lock()
    }

    /// Requests recorded so far.
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    fn provider_key(&self) -> &str {
        &self.provider_key
    }

    async fn stream_chat(&self, request: ProviderRequest) -> Result<BackendStream, BridgeError> {
        *self.calls.lock() += 1;
        self.requests.lock().push(request);

        {
            let mut failures = self.failures_remaining.lock();
            if let Some(remaining) = failures.as_mut() {
                if *remaining > 0 {
                    *remaining = remaining.saturating_sub(1);
                    return Err(BridgeError::backend("scripted failure"));
                }
            }
        }

        let turn = self.turns.lock().pop_front().unwrap_or_default();
        let mut items: Vec<Result<BackendEvent, BridgeError>> =
            turn.events.into_iter().map(Ok).collect();
        if let Some(message) = turn.error_after {
            items.push(Err(BridgeError::backend(message)));
        }

        Ok(Box::pin(stream::iter(items)))
    }
}
