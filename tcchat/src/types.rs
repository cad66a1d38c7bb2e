//! Chat events, policies, and request types.

use std::pin::Pin;

use futures_core::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tccommon::{ChatId, UserId};
use tcprovider::{FinishReason, Message, TokenUsage};
use tctooling::{ToolExecutionResult, ToolOutcome};

pub const DEFAULT_MAX_STEPS: u32 = 10;
pub const DEFAULT_TASK_NAME: &str = "Processing your financial query";

/// One record of the client-facing stream, serialized as `{"type": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum ChatEvent {
    UserMessageId(String),
    #[serde(rename_all = "camelCase")]
    QueryLoading {
        is_loading: bool,
        task_names: Vec<String>,
    },
    TextDelta(String),
    #[serde(rename_all = "camelCase")]
    ToolResult {
        tool_name: String,
        arguments: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    MessageAnnotation { server_message_id: String },
    #[serde(rename_all = "camelCase")]
    Finish {
        finish_reason: FinishReason,
        usage: TokenUsage,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl ChatEvent {
    pub fn loading(task_names: &[String]) -> Self {
        Self::QueryLoading {
            is_loading: true,
            task_names: task_names.to_vec(),
        }
    }

    pub fn loaded() -> Self {
        Self::QueryLoading {
            is_loading: false,
            task_names: Vec::new(),
        }
    }

    pub fn tool_result(result: &ToolExecutionResult) -> Self {
        let (payload, error) = match &result.outcome {
            ToolOutcome::Payload(value) => (Some(value.clone()), None),
            ToolOutcome::Error(description) => (None, Some(description.clone())),
        };
        Self::ToolResult {
            tool_name: result.tool_name.clone(),
            arguments: result.arguments.clone(),
            result: payload,
            error,
        }
    }

    pub fn finish(finish_reason: FinishReason, usage: TokenUsage) -> Self {
        Self::Finish {
            finish_reason,
            usage,
            error: None,
        }
    }

    pub fn failed(description: impl Into<String>, usage: TokenUsage) -> Self {
        Self::Finish {
            finish_reason: FinishReason::Error,
            usage,
            error: Some(description.into()),
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}

pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallingMode {
    #[default]
    Native,
    Prompt,
}

impl ToolCallingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Prompt => "prompt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPolicy {
    pub max_steps: u32,
    pub stream: bool,
    pub task_names: Vec<String>,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            stream: true,
            task_names: vec![DEFAULT_TASK_NAME.to_string()],
        }
    }
}

impl ChatPolicy {
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_task_names(mut self, task_names: Vec<String>) -> Self {
        self.task_names = task_names;
        self
    }
}

/// A chat turn as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub chat_id: ChatId,
    pub user_id: UserId,
    /// Target model identifier as understood by the endpoint.
    pub model: String,
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(
        chat_id: impl Into<ChatId>,
        user_id: UserId,
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id,
            model: model.into(),
            messages,
        }
    }

    pub fn latest_user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == tcprovider::Role::User)
    }
}
