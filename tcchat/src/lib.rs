//! Tool-calling orchestration for financial chat turns.

mod error;
mod hooks;
mod multiplexer;
mod native;
mod orchestrator;
mod parser;
mod prompt;
mod prompted;
mod service;
mod session;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatLoopHooks, ChatPolicy,
        ChatRecord, ChatRequest, ChatService, ChatStore, InMemoryChatStore, NoopChatLoopHooks,
        Orchestrator, RecordStream, Session, StoredMessage, ToolCallingMode, build_orchestrator,
    };
    pub use tccommon::{ChatId, MetadataMap, SessionId, UserId};
    pub use tctooling::{
        DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ChatLoopHooks, NoopChatLoopHooks};
pub use multiplexer::{NDJSON_CONTENT_TYPE, RecordStream, encode_record};
pub use native::NativeOrchestrator;
pub use orchestrator::{Orchestrator, build_orchestrator};
pub use parser::{TOOL_CALL_MARKER, parse_tool_calls};
pub use prompt::{
    DEFAULT_SYSTEM_PROMPT, FOLLOW_UP_USER_REQUEST, follow_up_system_prompt,
    prompt_tool_instructions, render_tool_results,
};
pub use prompted::PromptOrchestrator;
pub use service::{ChatService, chat_title, delete_owned_chat};
pub use session::Session;
pub use store::{ChatFuture, ChatRecord, ChatStore, InMemoryChatStore, StoredMessage};
pub use types::{
    ChatEvent, ChatEventStream, ChatPolicy, ChatRequest, DEFAULT_MAX_STEPS, DEFAULT_TASK_NAME,
    ToolCallingMode,
};
pub use tccommon::{ChatId, MetadataMap, SessionId, UserId};
pub use tctooling::{
    DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult,
    ToolRegistry, ToolRuntime,
};
