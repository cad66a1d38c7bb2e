//! Common `tcprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, DEFAULT_MODEL_ID, FinishReason, Message, ModelCatalog, ModelEventStream,
    ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse, ModelSpec, OutputItem,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, Role, SecretString,
    SecureCredentialManager, StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use tccommon::{BoxFuture, MetadataMap};
