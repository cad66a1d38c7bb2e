//! Orchestration contract shared by the native and prompt strategies.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures_core::Stream;
use futures_util::StreamExt;
use tcprovider::{
    FinishReason, Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
    Role, StreamEvent, TokenUsage,
};
use tctooling::ToolRuntime;

use crate::{
    ChatEvent, ChatEventStream, ChatLoopHooks, ChatPolicy, NativeOrchestrator,
    PromptOrchestrator, Session, ToolCallingMode,
};

/// Drives one session to completion. The returned stream is lazy, finite, and
/// ends with exactly one `finish` event.
pub trait Orchestrator: Send + Sync {
    fn mode(&self) -> ToolCallingMode;

    fn run(&self, session: Session) -> ChatEventStream;
}

pub fn build_orchestrator(
    mode: ToolCallingMode,
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatLoopHooks>,
) -> Arc<dyn Orchestrator> {
    match mode {
        ToolCallingMode::Native => Arc::new(
            NativeOrchestrator::new(provider, tools)
                .with_policy(policy)
                .with_hooks(hooks),
        ),
        ToolCallingMode::Prompt => Arc::new(
            PromptOrchestrator::new(provider, tools)
                .with_policy(policy)
                .with_hooks(hooks),
        ),
    }
}

pub(crate) enum RoundItem {
    Delta(String),
    Done(ModelResponse),
    Failed(ProviderError),
}

pub(crate) type RoundStream = Pin<Box<dyn Stream<Item = RoundItem> + Send>>;

/// Runs one generation. Yields text deltas, then exactly one `Done` or `Failed`.
/// Without streaming the whole text arrives as a single delta.
pub(crate) fn generate_round(
    provider: Arc<dyn ModelProvider>,
    request: ModelRequest,
    streaming: bool,
) -> RoundStream {
    Box::pin(stream! {
        if !streaming {
            match provider.complete(request).await {
                Ok(response) => {
                    let text = response.text();
                    if !text.is_empty() {
                        yield RoundItem::Delta(text);
                    }
                    yield RoundItem::Done(response);
                }
                Err(error) => yield RoundItem::Failed(error),
            }
            return;
        }

        let model = request.model.clone();
        let mut events = match provider.stream(request).await {
            Ok(events) => events,
            Err(error) => {
                yield RoundItem::Failed(error);
                return;
            }
        };

        let mut text = String::new();
        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::TextDelta(delta)) => {
                    text.push_str(&delta);
                    yield RoundItem::Delta(delta);
                }
                Ok(StreamEvent::ToolCallDelta(_)) => {}
                Ok(StreamEvent::ResponseComplete(response)) => {
                    yield RoundItem::Done(response);
                    return;
                }
                Err(error) => {
                    yield RoundItem::Failed(error);
                    return;
                }
            }
        }

        tracing::warn!(model = %model, "model stream ended without a final response");
        yield RoundItem::Done(ModelResponse {
            provider: provider.id(),
            model,
            output: vec![OutputItem::Message(Message::new(Role::Assistant, text))],
            finish_reason: FinishReason::Other,
            usage: TokenUsage::default(),
        });
    })
}

/// Emits the `query-loading{false}` event at most once.
#[derive(Debug, Default)]
pub(crate) struct LoadingGate {
    closed: bool,
}

impl LoadingGate {
    pub(crate) fn close(&mut self) -> Option<ChatEvent> {
        if self.closed {
            return None;
        }
        self.closed = true;
        Some(ChatEvent::loaded())
    }
}

/// Final event of a run that hit a model-endpoint error.
pub(crate) fn model_failure(session: &Session, step: u32, error: &ProviderError) -> ChatEvent {
    tracing::error!(
        session_id = %session.id,
        step,
        error_kind = ?error.kind,
        error = %error,
        "model round failed"
    );
    ChatEvent::failed(error.public_description(), TokenUsage::default())
}
