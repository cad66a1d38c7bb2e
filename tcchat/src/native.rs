//! Native structured tool calling: the endpoint requests calls, the loop runs
//! them and feeds the results back until the model stops or the step ceiling hits.

use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures_util::StreamExt;
use serde_json::json;
use tcprovider::{FinishReason, Message, ModelProvider, ProviderError, ToolCall, ToolResult};
use tctooling::{ToolCallRequest, ToolRuntime};

use crate::orchestrator::{LoadingGate, RoundItem, generate_round, model_failure};
use crate::{
    ChatEvent, ChatEventStream, ChatLoopHooks, ChatPolicy, DEFAULT_SYSTEM_PROMPT,
    NoopChatLoopHooks, Orchestrator, Session, ToolCallingMode,
};

const DUPLICATE_CALL_NOTICE: &str =
    "Duplicate call skipped; the result was already provided earlier in this conversation";

#[derive(Clone)]
pub struct NativeOrchestrator {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatLoopHooks>,
}

impl NativeOrchestrator {
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

impl Orchestrator for NativeOrchestrator {
    fn mode(&self) -> ToolCallingMode {
        ToolCallingMode::Native
    }

    fn run(&self, mut session: Session) -> ChatEventStream {
        let this = self.clone();

        Box::pin(stream! {
            let mode = ToolCallingMode::Native;
            let mut loading = LoadingGate::default();
            yield ChatEvent::loading(&this.policy.task_names);

            let definitions = this.tools.definitions();
            let system_prompt = session
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
            let mut last_reason = FinishReason::Stop;
            let mut hit_ceiling = true;

            while session.step < this.policy.max_steps {
                session.step += 1;
                let step = session.step;
                let started = Instant::now();
                this.hooks.on_round_start(&session.id, mode, step);

                let request = session.model_request(
                    Some(system_prompt.clone()),
                    session.conversation.clone(),
                    definitions.clone(),
                    this.policy.stream,
                );
                let request = match request {
                    Ok(request) => request,
                    Err(error) => {
                        this.hooks.on_round_failure(&session.id, mode, step, &error, started.elapsed());
                        if let Some(event) = loading.close() {
                            yield event;
                        }
                        yield model_failure(&session, step, &error);
                        return;
                    }
                };

                let mut round = generate_round(Arc::clone(&this.provider), request, this.policy.stream);
                let mut outcome = None;
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

                let outcome = outcome.unwrap_or_else(|| {
                    Err(ProviderError::other("model round produced no response"))
                });
                let response = match outcome {
                    Ok(response) => response,
                    Err(error) => {
                        this.hooks.on_round_failure(&session.id, mode, step, &error, started.elapsed());
                        if let Some(event) = loading.close() {
                            yield event;
                        }
                        yield model_failure(&session, step, &error);
                        return;
                    }
                };

                session.record_usage(response.usage);
                last_reason = response.finish_reason;
                this.hooks.on_round_success(
                    &session.id,
                    mode,
                    step,
                    response.finish_reason,
                    &response.usage,
                    started.elapsed(),
                );

                let text = response.text();
                let calls = response.tool_calls();
                if response.finish_reason != FinishReason::ToolCalls || calls.is_empty() {
                    session.conversation.push(Message::assistant(text));
                    hit_ceiling = false;
                    break;
                }

                tracing::debug!(session_id = %session.id, step, calls = calls.len(), "executing tool calls");
                session
                    .conversation
                    .push(Message::assistant_with_tool_calls(text, calls.clone()));

                let mut turns: Vec<Option<Message>> = vec![None; calls.len()];
                let mut slots = Vec::new();
                let mut requests = Vec::new();
                for (index, call) in calls.iter().enumerate() {
                    match ToolCallRequest::from_tool_call(call) {
                        Ok(request) => {
                            if session
                                .dedup
                                .should_execute(&request.tool_name, &request.arguments_value())
                            {
                                slots.push(index);
                                requests.push(request);
                            } else {
                                this.hooks.on_duplicate_call(&session.id, &request.tool_name);
                                turns[index] = Some(notice_turn(call, DUPLICATE_CALL_NOTICE));
                            }
                        }
                        Err(error) => {
                            tracing::warn!(
                                session_id = %session.id,
                                tool = %call.name,
                                error = %error,
                                "dropping tool call with unparseable arguments"
                            );
                            turns[index] = Some(notice_turn(call, &error.message));
                        }
                    }
                }

                let results = this.tools.execute_all(requests, session.tool_context()).await;
                for (index, result) in slots.into_iter().zip(results) {
                    yield ChatEvent::tool_result(&result);
                    turns[index] = Some(Message::tool_result(result.into_tool_result()));
                }
                session.conversation.extend(turns.into_iter().flatten());
            }

            if hit_ceiling {
                tracing::warn!(
                    session_id = %session.id,
                    max_steps = this.policy.max_steps,
                    "step ceiling reached"
                );
                this.hooks.on_step_ceiling(&session.id, this.policy.max_steps);
            }

            if let Some(event) = loading.close() {
                yield event;
            }
            yield ChatEvent::finish(last_reason, session.usage);
        })
    }
}

/// A tool turn answering a call that was not executed.
fn notice_turn(call: &ToolCall, notice: &str) -> Message {
    Message::tool_result(ToolResult {
        tool_call_id: call.id.clone(),
        output: json!({ "error": notice }).to_string(),
    })
}
