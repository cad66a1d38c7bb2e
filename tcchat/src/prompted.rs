//! Prompt-based tool calling: markers in the first completion select the
//! calls, and one follow-up generation turns their results into the answer.

use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures_util::StreamExt;
use tcprovider::{Message, ModelProvider, ProviderError};
use tctooling::ToolRuntime;

use crate::orchestrator::{LoadingGate, RoundItem, generate_round, model_failure};
use crate::{
    ChatEvent, ChatEventStream, ChatLoopHooks, ChatPolicy, DEFAULT_SYSTEM_PROMPT,
    FOLLOW_UP_USER_REQUEST, NoopChatLoopHooks, Orchestrator, Session, ToolCallingMode,
    follow_up_system_prompt, parse_tool_calls, prompt_tool_instructions,
};

/// Runs at most two generations regardless of `ChatPolicy::max_steps`.
#[derive(Clone)]
pub struct PromptOrchestrator {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatLoopHooks>,
}

impl PromptOrchestrator {
    pub fn new(provider: Arc<dyn ModelProvider>, tools: Arc<dyn ToolRuntime>) -> Self {
        Self {
            provider,
            tools,
            policy: ChatPolicy::default(),
            hooks: Arc::new(NoopChatLoopHooks),
        }
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ChatLoopHooks>) -> Self {
        self.hooks = hooks;
        self
    }
}

impl Orchestrator for PromptOrchestrator {
    fn mode(&self) -> ToolCallingMode {
        ToolCallingMode::Prompt
    }

    fn run(&self, mut session: Session) -> ChatEventStream {
        let this = self.clone();

        Box::pin(stream! {
            let mode = ToolCallingMode::Prompt;
            let mut loading = LoadingGate::default();
            yield ChatEvent::loading(&this.policy.task_names);

            session.step = 1;
            let started = Instant::now();
            this.hooks.on_round_start(&session.id, mode, session.step);

            let base = session
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
            let instructions = prompt_tool_instructions(&base, &this.tools.definitions());
            let first = match session.model_request(
                Some(instructions),
                session.conversation.clone(),
                Vec::new(),
                false,
            ) {
                Ok(request) => this.provider.complete(request).await,
                Err(error) => Err(error),
            };

            let first = match first {
                Ok(response) => response,
                Err(error) => {
                    this.hooks.on_round_failure(&session.id, mode, session.step, &error, started.elapsed());
                    if let Some(event) = loading.close() {
                        yield event;
                    }
                    yield model_failure(&session, session.step, &error);
                    return;
                }
            };

            session.record_usage(first.usage);
            this.hooks.on_round_success(
                &session.id,
                mode,
                session.step,
                first.finish_reason,
                &first.usage,
                started.elapsed(),
            );

            let text = first.text();
            let calls = parse_tool_calls(&text);
            if calls.is_empty() {
                if let Some(event) = loading.close() {
                    yield event;
                }
                if !text.is_empty() {
                    yield ChatEvent::TextDelta(text);
                }
                yield ChatEvent::finish(first.finish_reason, session.usage);
                return;
            }

            let mut requests = Vec::new();
            for call in calls {
                if session.dedup.should_execute(&call.tool_name, &call.arguments_value()) {
                    requests.push(call);
                } else {
                    this.hooks.on_duplicate_call(&session.id, &call.tool_name);
                }
            }
            tracing::debug!(session_id = %session.id, calls = requests.len(), "executing prompt tool calls");

            let results = this.tools.execute_all(requests, session.tool_context()).await;
            for result in &results {
                yield ChatEvent::tool_result(result);
            }

            session.step = 2;
            let started = Instant::now();
            this.hooks.on_round_start(&session.id, mode, session.step);

            let mut messages = session.conversation.clone();
            messages.push(Message::user(FOLLOW_UP_USER_REQUEST));
            let request = session.model_request(
                Some(follow_up_system_prompt(&results)),
                messages,
                Vec::new(),
                this.policy.stream,
            );

            let mut outcome = None;
            match request {
                Ok(request) => {
                    let mut round = generate_round(Arc::clone(&this.provider), request, this.policy.stream);
                    while let Some(item) = round.next().await {
                        match item {
                            RoundItem::Delta(delta) => {
                                if let Some(event) = loading.close() {
                                    yield event;
                                }
                                yield ChatEvent::TextDelta(delta);
                            }
                            RoundItem::Done(response) => outcome = Some(Ok(response)),
                            RoundItem::Failed(error) => outcome = Some(Err(error)),
                        }
                    }
                }
                Err(error) => outcome = Some(Err(error)),
            }

            let outcome = outcome.unwrap_or_else(|| {
                Err(ProviderError::other("follow-up generation produced no response"))
            });
            match outcome {
                Ok(response) => {
                    session.record_usage(response.usage);
                    this.hooks.on_round_success(
                        &session.id,
                        mode,
                        session.step,
                        response.finish_reason,
                        &response.usage,
                        started.elapsed(),
                    );
                    if let Some(event) = loading.close() {
                        yield event;
                    }
                    yield ChatEvent::finish(response.finish_reason, session.usage);
                }
                Err(error) => {
                    this.hooks.on_round_failure(&session.id, mode, session.step, &error, started.elapsed());
                    if let Some(event) = loading.close() {
                        yield event;
                    }
                    yield model_failure(&session, session.step, &error);
                }
            }
        })
    }
}
