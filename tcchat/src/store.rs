//! Chat persistence contract and a basic in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tccommon::{BoxFuture, ChatId, UserId};
use tcprovider::Role;

use crate::ChatError;

pub type ChatFuture<'a, T> = BoxFuture<'a, T>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: ChatId,
    pub user_id: UserId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: String,
    pub chat_id: ChatId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(
        id: impl Into<String>,
        chat_id: ChatId,
        role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            chat_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

pub trait ChatStore: Send + Sync {
    fn get_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> ChatFuture<'a, Result<Option<ChatRecord>, ChatError>>;

    fn save_chat<'a>(&'a self, chat: ChatRecord) -> ChatFuture<'a, Result<(), ChatError>>;

    fn save_messages<'a>(
        &'a self,
        messages: Vec<StoredMessage>,
    ) -> ChatFuture<'a, Result<(), ChatError>>;

    fn delete_chat<'a>(&'a self, id: &'a ChatId) -> ChatFuture<'a, Result<(), ChatError>>;
}

#[derive(Debug, Default)]
struct StoreState {
    chats: HashMap<ChatId, ChatRecord>,
    messages: HashMap<ChatId, Vec<StoredMessage>>,
}

#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    state: Mutex<StoreState>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages saved for `chat_id`, oldest first.
    pub fn messages(&self, chat_id: &ChatId) -> Result<Vec<StoredMessage>, ChatError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ChatError::store("chat store lock poisoned"))?;
        Ok(state.messages.get(chat_id).cloned().unwrap_or_default())
    }
}

impl ChatStore for InMemoryChatStore {
    fn get_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> ChatFuture<'a, Result<Option<ChatRecord>, ChatError>> {
        Box::pin(async move {
            let state = self
                .state
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;
            Ok(state.chats.get(id).cloned())
        })
    }

    fn save_chat<'a>(&'a self, chat: ChatRecord) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self
                .state
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;
            state.chats.insert(chat.id.clone(), chat);
            Ok(())
        })
    }

    fn save_messages<'a>(
        &'a self,
        messages: Vec<StoredMessage>,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self
                .state
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;
            for message in messages {
                state
                    .messages
                    .entry(message.chat_id.clone())
                    .or_default()
                    .push(message);
            }
            Ok(())
        })
    }

    fn delete_chat<'a>(&'a self, id: &'a ChatId) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut state = self
                .state
                .lock()
                .map_err(|_| ChatError::store("chat store lock poisoned"))?;
            state.chats.remove(id);
            state.messages.remove(id);
            Ok(())
        })
    }
}
