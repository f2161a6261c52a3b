//! Append-only, size-bounded audit log of exchanges.
//!
//! A correlation id is opened at orchestration setup and committed at
//! finalize; the console collaborator reads the record feed and watches the
//! revision channel for changes. The log never stores full transcripts
//! beyond its fixed ring capacity - the oldest record is dropped first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use polybridge_core::{ChatMessage, TokenUsage, ToolCallContent, ToolDefinition};

/// Default ring capacity.
pub const DEFAULT_AUDIT_CAPACITY: usize = 50;

/// The request half of an audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    /// Host messages as submitted.
    pub messages: Vec<ChatMessage>,
    /// Tools offered on this exchange.
    pub tools: Vec<ToolDefinition>,
    /// Model slug served.
    pub model_slug: String,
    /// When the exchange started.
    pub timestamp: DateTime<Utc>,
}

impl RequestSnapshot {
    /// Snapshot a request now.
    #[must_use]
    pub fn new(
        messages: Vec<ChatMessage>,
        tools: Vec<ToolDefinition>,
        model_slug: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            tools,
            model_slug: model_slug.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The response half of an audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// Accumulated text segments.
    pub text_parts: Vec<String>,
    /// Accumulated thinking segments.
    pub thinking_parts: Vec<String>,
    /// Tool calls issued by the model.
    pub tool_call_parts: Vec<ToolCallContent>,
    /// Token usage.
    pub usage: TokenUsage,
    /// Wall-clock duration of the exchange.
    pub duration_ms: u64,
    /// Output throughput.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_per_second: Option<f64>,
    /// When the exchange finished.
    pub timestamp: DateTime<Utc>,
}

impl ResponseSnapshot {
    /// Combined text content.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.text_parts.join("")
    }
}

/// One request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Correlation id.
    pub id: String,
    /// The request as submitted.
    pub request: RequestSnapshot,
    /// The response, absent while the exchange is in flight or if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
}

/// Bounded audit log with change notification.
#[derive(Debug)]
pub struct AuditLog {
    capacity: usize,
    records: Mutex<VecDeque<ExchangeRecord>>,
    revision: watch::Sender<u64>,
}

impl AuditLog {
    /// Create a log with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }

    /// Create a log with an explicit capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
            revision,
        }
    }

    /// Open a correlation id for a new exchange, dropping the oldest record
    /// if the ring is full.
    pub fn open(&self, request: RequestSnapshot) -> String {
        let id = Uuid::new_v4().to_string();
        {
            let mut records = self.records.lock();
            while records.len() >= self.capacity {
                records.pop_front();
            }
            records.push_back(ExchangeRecord {
                id: id.clone(),
                request,
                response: None,
            });
        }
        self.bump();
        id
    }

    /// Commit the response under a previously opened correlation id.
    ///
    /// Committing an id that has already been evicted is a no-op.
    pub fn commit(&self, id: &str, response: ResponseSnapshot) {
        {
            let mut records = self.records.lock();
            match records.iter_mut().find(|r| r.id == id) {
                Some(record) => record.response = Some(response),
                None => {
                    debug!(id, "audit record evicted before commit");
                    return;
                }
            }
        }
        self.bump();
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<ExchangeRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Subscribe to change notifications. The value is a revision counter.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(slug: &str) -> RequestSnapshot {
        RequestSnapshot::new(vec![ChatMessage::user("Hi")], Vec::new(), slug)
    }

    fn response(text: &str) -> ResponseSnapshot {
        ResponseSnapshot {
            text_parts: vec![text.to_string()],
            thinking_parts: Vec::new(),
            tool_call_parts: Vec::new(),
            usage: TokenUsage::new(),
            duration_ms: 5,
            tokens_per_second: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_open_commit() {
        let log = AuditLog::new();
        let id = log.open(request("gpt-4o"));
        log.commit(&id, response("Hello"));

        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].response.as_ref().unwrap().text_content(),
            "Hello"
        );
    }

    #[test]
    fn test_oldest_dropped_at_capacity() {
        let log = AuditLog::with_capacity(2);
        let first = log.open(request("a"));
        log.open(request("b"));
        log.open(request("c"));

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.id != first));
        // Committing the evicted id is a no-op.
        log.commit(&first, response("late"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_change_notification() {
        let log = AuditLog::new();
        let rx = log.subscribe();
        assert_eq!(*rx.borrow(), 0);

        let id = log.open(request("m"));
        assert_eq!(*rx.borrow(), 1);
        log.commit(&id, response("done"));
        assert_eq!(*rx.borrow(), 2);
    }
}
