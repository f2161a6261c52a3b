//! The three-phase streaming orchestrator.
//!
//! Every backend variant shares this lifecycle: setup (resolve, translate,
//! open the audit correlation id), execute (stream, dispatch parts in
//! arrival order, run variant hooks), finalize (usage, throughput, status,
//! audit commit). Provider-agnostic behavior lives here and nowhere else.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use polybridge_backends::{BackendVariant, HookContext, ProviderRequest};
use polybridge_cache::CacheRegistry;
use polybridge_core::{
    BackendEvent, BridgeError, ChatMessage, ResultData, StreamingPart, ToolDefinition,
};
use polybridge_translate::{to_host, to_provider, tools_to_provider};

use crate::audit::{AuditLog, RequestSnapshot, ResponseSnapshot};
use crate::config::ModelConfig;
use crate::context::{ExchangePhase, RequestContext};
use crate::sink::{HostSink, StatusReporter};

/// Shared service objects threaded through every exchange.
///
/// Explicitly constructed and passed by reference so tests can build
/// isolated instances; there are no process-wide singletons.
#[derive(Clone, Copy)]
pub struct ExchangeServices<'a> {
    /// The metadata cache registry.
    pub cache: &'a CacheRegistry,
    /// The audit log.
    pub audit: &'a AuditLog,
    /// The token-count status collaborator.
    pub status: &'a dyn StatusReporter,
}

/// One chat exchange through a backend variant.
pub struct Exchange<'a> {
    variant: &'a dyn BackendVariant,
    model: &'a ModelConfig,
    conversation_id: &'a str,
    services: ExchangeServices<'a>,
    phase: ExchangePhase,
}

impl<'a> Exchange<'a> {
    /// Create an idle exchange.
    #[must_use]
    pub fn new(
        variant: &'a dyn BackendVariant,
        model: &'a ModelConfig,
        conversation_id: &'a str,
        services: ExchangeServices<'a>,
    ) -> Self {
        Self {
            variant,
            model,
            conversation_id,
            services,
            phase: ExchangePhase::Idle,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    /// Run the full setup → execute → finalize lifecycle once.
    pub async fn run(
        &mut self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        sink: &dyn HostSink,
        cancel: &CancellationToken,
    ) -> Result<ResponseSnapshot, BridgeError> {
        let base = self.variant;
        let variant = base.resolve(&self.model.slug)?;

        self.phase = ExchangePhase::SettingUp;
        let mut ctx = match self.setup(variant, messages, tools) {
            Ok(ctx) => ctx,
            Err(err) => {
                self.phase = ExchangePhase::Failed;
                return Err(err);
            }
        };

        self.phase = ExchangePhase::Streaming;
        let result = match self.execute(variant, &mut ctx, tools, sink, cancel).await {
            Ok(result) => result,
            Err(err) => {
                self.phase = ExchangePhase::Failed;
                return Err(err);
            }
        };

        self.phase = ExchangePhase::Finalizing;
        let snapshot = self.finalize(variant, ctx, result);
        self.phase = ExchangePhase::Done;
        Ok(snapshot)
    }

    fn hook_ctx(&self) -> HookContext<'a> {
        HookContext {
            cache: self.services.cache,
            conversation_id: self.conversation_id,
            model_slug: &self.model.slug,
        }
    }

    fn setup(
        &self,
        variant: &dyn BackendVariant,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<RequestContext, BridgeError> {
        let provider_tools = tools_to_provider(tools)?;
        let translated = to_provider(messages, &variant.translation_options(), self.services.cache)?;
        let provider_options = variant.provider_options(&self.hook_ctx());

        let audit_id = self.services.audit.open(RequestSnapshot::new(
            messages.to_vec(),
            tools.to_vec(),
            &self.model.slug,
        ));

        let request = ProviderRequest::new(translated.messages)
            .with_system(translated.system)
            .with_tools(provider_tools)
            .with_sampling(self.model.sampling.clone())
            .with_provider_options(provider_options);

        Ok(RequestContext::new(request, audit_id))
    }

    async fn execute(
        &self,
        variant: &dyn BackendVariant,
        ctx: &mut RequestContext,
        tools: &[ToolDefinition],
        sink: &dyn HostSink,
        cancel: &CancellationToken,
    ) -> Result<ResultData, BridgeError> {
        if cancel.is_cancelled() {
            return Err(BridgeError::Aborted);
        }

        let client = variant.client()?;
        let mut stream = client.stream_chat(ctx.request.clone()).await?;

        let hook_ctx = self.hook_ctx();
        let mut captured: Option<BridgeError> = None;
        let mut result = ResultData::new();

        while let Some(item) = stream.next().await {
            if cancel.is_cancelled() {
                return Err(BridgeError::Aborted);
            }
            match item {
                Ok(BackendEvent::Part(part)) => {
                    // After a captured error the loop only drains; parts
                    // already delivered to the host are never retracted,
                    // but nothing further is forwarded.
                    if captured.is_some() {
                        continue;
                    }
                    match &part {
                        StreamingPart::ToolCallEvent(event) => {
                            variant.process_tool_call_metadata(event, &hook_ctx);
                        }
                        StreamingPart::ReasoningDelta { id, text } => {
                            variant.process_reasoning_delta(id.as_deref(), text, &hook_ctx);
                        }
                        StreamingPart::TextDelta { .. } => {}
                    }
                    if let Some(host_part) = to_host(part, tools) {
                        sink.on_part(host_part.clone());
                        ctx.accumulator.push(&host_part);
                    }
                }
                Ok(BackendEvent::Finish(data)) => result = data,
                Err(err) => {
                    if captured.is_none() {
                        captured = Some(err);
                    }
                }
            }
        }

        // Re-thrown only after the loop exits, never mid-iteration.
        if let Some(err) = captured {
            return Err(err);
        }
        Ok(result)
    }

    fn finalize(
        &self,
        variant: &dyn BackendVariant,
        ctx: RequestContext,
        result: ResultData,
    ) -> ResponseSnapshot {
        variant.process_response_metadata(&result, &self.hook_ctx());

        let usage = variant.process_result_data(&result);
        let elapsed = ctx.started_at.elapsed();
        let tokens_per_second = usage.tokens_per_second(elapsed);

        self.services
            .status
            .update(usage.total().unwrap_or(0), self.model.context_window);

        debug!(
            model = %self.model.slug,
            duration_ms = elapsed.as_millis() as u64,
            "exchange finalized"
        );

        let snapshot =
            ctx.accumulator
                .into_snapshot(usage, elapsed.as_millis() as u64, tokens_per_second);
        self.services.audit.commit(&ctx.audit_id, snapshot.clone());
        snapshot
    }
}
