//! Chat service: wraps one orchestration run with persistence and the
//! client-facing bookkeeping events.

use std::sync::Arc;

use async_stream::stream;
use futures_util::StreamExt;
use tccommon::{ChatId, GenerationOptions, SessionId, UserId};
use tcprovider::{ModelProvider, Role};
use tctooling::ToolRuntime;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    ChatError, ChatEvent, ChatEventStream, ChatLoopHooks, ChatPolicy, ChatRecord, ChatRequest,
    ChatStore, NoopChatLoopHooks, Session, StoredMessage, ToolCallingMode, build_orchestrator,
};

const TITLE_MAX_CHARS: usize = 80;
const EVENT_BUFFER: usize = 64;
const ROUND_SEPARATOR: &str = "\n\n";

pub struct ChatService {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    store: Arc<dyn ChatStore>,
    mode: ToolCallingMode,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatLoopHooks>,
    system_prompt: Option<String>,
    options: GenerationOptions,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tools: Arc<dyn ToolRuntime>,
        store: Arc<dyn ChatStore>,
    ) -> Self {
        Self {
            provider,
            tools,
            store,
            mode: ToolCallingMode::default(),
            policy: ChatPolicy::default(),
            hooks: Arc::new(NoopChatLoopHooks),
            system_prompt: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_mode(mut self, mode: ToolCallingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ChatLoopHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn mode(&self) -> ToolCallingMode {
        self.mode
    }

    /// Starts a run for `request` and returns its event stream.
    ///
    /// The stream opens with `user-message-id`. The run itself executes on a
    /// spawned task and keeps going if the returned stream is dropped.
    pub async fn stream_chat(&self, request: ChatRequest) -> Result<ChatEventStream, ChatError> {
        let Some(user_message) = request.latest_user_message().cloned() else {
            return Err(ChatError::invalid_request("No user message found"));
        };

        self.ensure_chat(&request.chat_id, &request.user_id, &user_message.content)
            .await;

        let user_message_id = Uuid::new_v4().to_string();
        let stored = StoredMessage::new(
            user_message_id.clone(),
            request.chat_id.clone(),
            Role::User,
            user_message.content,
        );
        if let Err(error) = self.store.save_messages(vec![stored]).await {
            tracing::warn!(chat_id = %request.chat_id, error = %error, "failed to save user message");
        }

        let mut session = Session::new(
            SessionId::new(Uuid::new_v4().to_string()),
            request.model,
            request.messages,
        )
        .with_options(self.options);
        if let Some(system_prompt) = &self.system_prompt {
            session = session.with_system_prompt(system_prompt.clone());
        }

        tracing::info!(
            chat_id = %request.chat_id,
            session_id = %session.id,
            mode = self.mode.as_str(),
            model = %session.model,
            "starting chat run"
        );

        let orchestrator = build_orchestrator(
            self.mode,
            Arc::clone(&self.provider),
            Arc::clone(&self.tools),
            self.policy.clone(),
            Arc::clone(&self.hooks),
        );
        let (sender, mut receiver) = mpsc::channel(EVENT_BUFFER);
        let run = RunContext {
            chat_id: request.chat_id,
            store: Arc::clone(&self.store),
            sender,
        };
        tokio::spawn(run.drive(orchestrator.run(session)));

        Ok(Box::pin(stream! {
            yield ChatEvent::UserMessageId(user_message_id);
            while let Some(event) = receiver.recv().await {
                yield event;
            }
        }))
    }

    pub async fn delete_chat(&self, id: &ChatId, user_id: &UserId) -> Result<(), ChatError> {
        delete_owned_chat(self.store.as_ref(), id, user_id).await
    }

    async fn ensure_chat(&self, chat_id: &ChatId, user_id: &UserId, first_message: &str) {
        match self.store.get_chat(chat_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let record = ChatRecord {
                    id: chat_id.clone(),
                    user_id: user_id.clone(),
                    title: chat_title(first_message),
                };
                if let Err(error) = self.store.save_chat(record).await {
                    tracing::warn!(chat_id = %chat_id, error = %error, "failed to save chat");
                }
            }
            Err(error) => {
                tracing::warn!(chat_id = %chat_id, error = %error, "failed to load chat");
            }
        }
    }
}

struct RunContext {
    chat_id: ChatId,
    store: Arc<dyn ChatStore>,
    sender: mpsc::Sender<ChatEvent>,
}

impl RunContext {
    async fn drive(self, mut events: ChatEventStream) {
        let mut text = String::new();
        let mut round_break = false;
        let mut client_gone = false;

        while let Some(event) = events.next().await {
            match &event {
                ChatEvent::TextDelta(delta) if !delta.is_empty() => {
                    if round_break && !text.is_empty() {
                        text.push_str(ROUND_SEPARATOR);
                    }
                    round_break = false;
                    text.push_str(delta);
                }
                // Text after a tool result belongs to a later model round.
                ChatEvent::ToolResult { .. } => round_break = true,
                _ => {}
            }

            if matches!(&event, ChatEvent::Finish { error: None, .. }) && !text.is_empty() {
                let message_id = Uuid::new_v4().to_string();
                self.persist_assistant_message(message_id.clone(), std::mem::take(&mut text));
                let annotation = ChatEvent::MessageAnnotation {
                    server_message_id: message_id,
                };
                self.forward(annotation, &mut client_gone).await;
            }

            let finished = event.is_finish();
            self.forward(event, &mut client_gone).await;
            if finished {
                break;
            }
        }
    }

    async fn forward(&self, event: ChatEvent, client_gone: &mut bool) {
        if *client_gone {
            return;
        }
        if self.sender.send(event).await.is_err() {
            *client_gone = true;
            tracing::debug!(chat_id = %self.chat_id, "client went away, finishing run without it");
        }
    }

    fn persist_assistant_message(&self, message_id: String, content: String) {
        let store = Arc::clone(&self.store);
        let message = StoredMessage::new(message_id, self.chat_id.clone(), Role::Assistant, content);
        tokio::spawn(async move {
            let chat_id = message.chat_id.clone();
            if let Err(error) = store.save_messages(vec![message]).await {
                tracing::warn!(chat_id = %chat_id, error = %error, "failed to save assistant message");
            }
        });
    }
}

/// Deletes `id` when it exists and belongs to `user_id`.
pub async fn delete_owned_chat(
    store: &dyn ChatStore,
    id: &ChatId,
    user_id: &UserId,
) -> Result<(), ChatError> {
    let chat = store
        .get_chat(id)
        .await?
        .ok_or_else(|| ChatError::not_found("Not Found"))?;
    if &chat.user_id != user_id {
        return Err(ChatError::unauthorized("Unauthorized"));
    }
    store.delete_chat(id).await?;
    tracing::info!(chat_id = %id, "chat deleted");
    Ok(())
}

/// First line of the opening message, cut to a display-friendly length.
pub fn chat_title(message: &str) -> String {
    let line = message.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= TITLE_MAX_CHARS {
        return line.to_string();
    }
    line.chars().take(TITLE_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_first_line_and_truncates_on_char_boundaries() {
        assert_eq!(chat_title("How is AAPL?\nAlso MSFT"), "How is AAPL?");
        let long = "é".repeat(100);
        assert_eq!(chat_title(&long).chars().count(), 80);
        assert_eq!(chat_title(""), "");
    }
}
