mod auth;
mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::OpenAiProvider;
pub use transport::{
    HEROKU_INFERENCE_BASE_URL, OPENAI_BASE_URL, OpenAiChunkStream, OpenAiHttpTransport,
    OpenAiTransport,
};
pub use types::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiMessage, OpenAiRequest,
    OpenAiResponse, OpenAiRole, OpenAiStreamChunk, OpenAiTool, OpenAiToolCall, OpenAiUsage,
};
