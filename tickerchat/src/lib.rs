//! Unified facade over the tickerchat workspace crates.
//!
//! Most applications only need this crate: it re-exports the orchestration,
//! provider, tooling, market-data, and observability crates, and adds the
//! runtime wiring that turns a model id plus credentials into a chat run.

mod macros;

pub mod prelude;
pub mod providers;
pub mod runtime;
pub mod toolset;
pub mod util;

pub use tcchat;
pub use tccommon;
pub use tcmarket;
pub use tcobserve;
pub use tcprovider;
pub use tctooling;

pub use tcchat::{
    ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatLoopHooks, ChatPolicy, ChatRecord,
    ChatRequest, ChatService, ChatStore, InMemoryChatStore, NDJSON_CONTENT_TYPE,
    NoopChatLoopHooks, Orchestrator, RecordStream, Session, StoredMessage, ToolCallingMode,
    build_orchestrator, chat_title, delete_owned_chat, encode_record,
};
pub use tccommon::{BoxFuture, ChatId, GenerationOptions, MetadataMap, SessionId, UserId};
pub use tcobserve::{
    MetricsObservabilityHooks, SafeChatLoopHooks, SafeToolHooks, TracingObservabilityHooks,
};
pub use tcprovider::{
    BoxedEventStream, DEFAULT_MODEL_ID, FinishReason, Message, ModelCatalog, ModelEventStream,
    ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse, ModelSpec, OutputItem,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, Role, SecretString,
    SecureCredentialManager, StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult,
    VecEventStream,
};
pub use tctooling::{
    DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks, Tool, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime,
    ToolRuntimeHooks,
};

pub use providers::{
    DEFAULT_MODEL_TIMEOUT, ProviderBuildConfig, build_provider_from_api_key,
    build_provider_with_config, versioned_base_url,
};
pub use runtime::{ChatRuntime, ConfiguredKeys, RequestKeys, ServerKeys};
pub use toolset::{FinancialToolsetFactory, HttpProviderFactory, ProviderFactory, ToolsetFactory};
pub use util::{
    anonymous_request, assistant_message, parse_provider_id, parse_tool_mode, session,
    system_message, user_message,
};
