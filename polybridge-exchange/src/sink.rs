//! Host-facing progress and status interfaces.

use parking_lot::Mutex;

use polybridge_core::ContentPart;

/// The host's progress sink for incremental content parts.
///
/// Parts are delivered synchronously, in the exact order received from the
/// backend; implementations must not block.
pub trait HostSink: Send + Sync {
    /// Receive one incremental content part.
    fn on_part(&self, part: ContentPart);
}

/// A sink that buffers everything it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    parts: Mutex<Vec<ContentPart>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parts received so far, in delivery order.
    #[must_use]
    pub fn parts(&self) -> Vec<ContentPart> {
        self.parts.lock().clone()
    }

    /// Number of parts received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.lock().len()
    }

    /// Check if nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.lock().is_empty()
    }
}

impl HostSink for CollectingSink {
    fn on_part(&self, part: ContentPart) {
        self.parts.lock().push(part);
    }
}

/// Token-count display collaborator, updated after each exchange.
pub trait StatusReporter: Send + Sync {
    /// Report current and maximum token counts.
    fn update(&self, current_tokens: u64, max_tokens: Option<u64>);
}

/// A status reporter that discards updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatus;

impl StatusReporter for NullStatus {
    fn update(&self, _current_tokens: u64, _max_tokens: Option<u64>) {}
}

/// A status reporter that remembers the last update.
#[derive(Debug, Default)]
pub struct RecordingStatus {
    last: Mutex<Option<(u64, Option<u64>)>>,
}

impl RecordingStatus {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent update, if any.
    #[must_use]
    pub fn last(&self) -> Option<(u64, Option<u64>)> {
        *self.last.lock()
    }
}

impl StatusReporter for RecordingStatus {
    fn update(&self, current_tokens: u64, max_tokens: Option<u64>) {
        *self.last.lock() = Some((current_tokens, max_tokens));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_preserves_order() {
        let sink = CollectingSink::new();
        sink.on_part(ContentPart::text("a"));
        sink.on_part(ContentPart::text("b"));
        let parts = sink.parts();
        assert_eq!(parts[0].as_text(), Some("a"));
        assert_eq!(parts[1].as_text(), Some("b"));
    }

    #[test]
    fn test_recording_status() {
        let status = RecordingStatus::new();
        assert!(status.last().is_none());
        status.update(1200, Some(200_000));
        assert_eq!(status.last(), Some((1200, Some(200_000))));
    }
}
