//! Common imports for most tickerchat applications.

pub use crate::{
    anonymous_request, assistant_message, parse_provider_id, parse_tool_mode, session,
    system_message, user_message,
};
pub use crate::{
    ChatRuntime, ConfiguredKeys, FinancialToolsetFactory, HttpProviderFactory,
    ProviderBuildConfig, ProviderFactory, RequestKeys, ServerKeys, ToolsetFactory,
    build_provider_from_api_key, build_provider_with_config,
};
pub use crate::{tc_messages, tc_msg, tc_session};
pub use crate::{
    BoxFuture, ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatId, ChatPolicy,
    ChatRequest, ChatService, ChatStore, InMemoryChatStore, Message, ModelCatalog, ModelProvider,
    ModelSpec, ProviderError, ProviderId, RecordStream, Role, SecretString, Session, SessionId,
    ToolCallingMode, ToolDefinition, ToolError, ToolExecutionContext, ToolExecutionResult,
    ToolRegistry, ToolRuntime, UserId,
};
