//! Language-model endpoint contracts for tickerchat.
//!
//! The orchestration layer only sees [`ModelProvider`]; concrete endpoints live
//! under [`adapters`].

pub mod adapters;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod model;
pub mod prelude;
pub mod provider;
pub mod stream;

pub use catalog::{DEFAULT_MODEL_ID, ModelCatalog, ModelSpec};
pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    FinishReason, Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem,
    ProviderId, Role, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
