//! The retry envelope around one chat exchange.
//!
//! Wraps the full orchestration cycle in a bounded attempt loop. A failed
//! attempt discards everything its setup phase produced; the next attempt
//! translates and resolves from scratch, so a retried request is always
//! fully formed. Success on a later attempt is indistinguishable to the
//! host from first-attempt success, apart from the interleaved transient
//! notices.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use polybridge_backends::BackendVariant;
use polybridge_core::{BridgeError, ChatMessage, ContentPart, ThinkingContent, ToolDefinition};

use crate::audit::ResponseSnapshot;
use crate::config::ModelConfig;
use crate::orchestrator::{Exchange, ExchangeServices};
use crate::sink::HostSink;

/// Run one host call through the exchange lifecycle with retries.
///
/// Configuration errors and host cancellation surface immediately; backend
/// failures retry up to `model.max_attempts` with a host-visible transient
/// notice between attempts, then surface the last error.
pub async fn run_exchange(
    variant: &dyn BackendVariant,
    model: &ModelConfig,
    conversation_id: &str,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
    services: ExchangeServices<'_>,
    sink: &dyn HostSink,
    cancel: &CancellationToken,
) -> Result<ResponseSnapshot, BridgeError> {
    let max_attempts = model.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let mut exchange = Exchange::new(variant, model, conversation_id, services);

        match exchange.run(messages, tools, sink, cancel).await {
            Ok(snapshot) => {
                if attempt > 1 {
                    debug!(attempt, model = %model.slug, "exchange succeeded after retry");
                }
                return Ok(snapshot);
            }
            Err(err) if !err.is_retryable() => {
                // Aborted and configuration/translation failures are
                // terminal; retrying cannot change the outcome.
                return Err(err);
            }
            Err(err) => {
                if attempt >= max_attempts {
                    warn!(
                        attempt,
                        model = %model.slug,
                        error = %err,
                        "exchange failed; attempts exhausted"
                    );
                    return Err(err);
                }
                debug!(attempt, model = %model.slug, error = %err, "transient backend failure; retrying");
                sink.on_part(ContentPart::Thinking(ThinkingContent::error_marker(
                    format!("Request failed ({err}); retrying..."),
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLog;
    use crate::sink::{CollectingSink, NullStatus};
    use polybridge_backends::{OpenAiVariant, ScriptedBackend, ScriptedTurn};
    use polybridge_cache::CacheRegistry;
    use std::sync::Arc;

    struct Fixture {
        cache: CacheRegistry,
        audit: AuditLog,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                cache: CacheRegistry::new(),
                audit: AuditLog::new(),
            }
        }

        fn services(&self) -> ExchangeServices<'_> {
            ExchangeServices {
                cache: &self.cache,
                audit: &self.audit,
                status: &NullStatus,
            }
        }
    }

    #[tokio::test]
    async fn test_always_failing_backend_hits_attempt_bound() {
        let backend = ScriptedBackend::new("openai").always_failing();
        let probe = backend.clone();
        let variant = OpenAiVariant::new(Arc::new(backend));
        let model = ModelConfig::new("gpt-4o", "openai").with_max_attempts(3);
        let fixture = Fixture::new();
        let sink = CollectingSink::new();

        let err = run_exchange(
            &variant,
            &model,
            "conv-1",
            &[ChatMessage::user("go")],
            &[],
            fixture.services(),
            &sink,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        // Exactly three backend invocations, one terminal error.
        assert_eq!(probe.call_count(), 3);
        assert!(err.is_retryable());

        // Two transient notices, tagged as local error banners.
        let parts = sink.parts();
        assert_eq!(parts.len(), 2);
        for part in parts {
            let ContentPart::Thinking(think) = part else {
                panic!("expected thinking banner");
            };
            assert!(think.is_error_marker());
        }
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let backend = ScriptedBackend::new("openai")
            .with_initial_failures(2)
            .with_turn(ScriptedTurn::new().text_deltas(&["recovered"]));
        let probe = backend.clone();
        let variant = OpenAiVariant::new(Arc::new(backend));
        let model = ModelConfig::new("gpt-4o", "openai").with_max_attempts(3);
        let fixture = Fixture::new();
        let sink = CollectingSink::new();

        let snapshot = run_exchange(
            &variant,
            &model,
            "conv-1",
            &[ChatMessage::user("go")],
            &[],
            fixture.services(),
            &sink,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(probe.call_count(), 3);
        assert_eq!(snapshot.text_content(), "recovered");

        // Notices for the failed attempts, then the real output.
        let parts = sink.parts();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].is_thinking());
        assert!(parts[1].is_thinking());
        assert_eq!(parts[2].as_text(), Some("recovered"));
    }

    #[tokio::test]
    async fn test_configuration_error_not_retried() {
        let backend = ScriptedBackend::new("openai");
        let probe = backend.clone();
        let variant = OpenAiVariant::new(Arc::new(backend));
        let model = ModelConfig::new("gpt-4o", "openai").with_max_attempts(3);
        let fixture = Fixture::new();
        let sink = CollectingSink::new();

        let tools = vec![ToolDefinition::new("bad name", "nope")];
        let err = run_exchange(
            &variant,
            &model,
            "conv-1",
            &[ChatMessage::user("go")],
            &tools,
            fixture.services(),
            &sink,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BridgeError::Configuration(_)));
        assert_eq!(probe.call_count(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_not_retried() {
        let backend = ScriptedBackend::new("openai")
            .with_turn(ScriptedTurn::new().text_deltas(&["x"]));
        let probe = backend.clone();
        let variant = OpenAiVariant::new(Arc::new(backend));
        let model = ModelConfig::new("gpt-4o", "openai").with_max_attempts(3);
        let fixture = Fixture::new();
        let sink = CollectingSink::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_exchange(
            &variant,
            &model,
            "conv-1",
            &[ChatMessage::user("go")],
            &[],
            fixture.services(),
            &sink,
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(err.is_aborted());
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_retries_with_fresh_request() {
        let backend = ScriptedBackend::new("openai")
            .with_turn(ScriptedTurn::new().text_deltas(&["part"]).then_error("reset"))
            .with_turn(ScriptedTurn::new().text_deltas(&["whole answer"]));
        let probe = backend.clone();
        let variant = OpenAiVariant::new(Arc::new(backend));
        let model = ModelConfig::new("gpt-4o", "openai").with_max_attempts(2);
        let fixture = Fixture::new();
        let sink = CollectingSink::new();

        let snapshot = run_exchange(
            &variant,
            &model,
            "conv-1",
            &[ChatMessage::user("go")],
            &[],
            fixture.services(),
            &sink,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.text_content(), "whole answer");
        assert_eq!(probe.call_count(), 2);
        // Both attempts submitted the same fully formed message set.
        let requests = probe.recorded_requests();
        assert_eq!(requests[0].messages, requests[1].messages);
    }
}
