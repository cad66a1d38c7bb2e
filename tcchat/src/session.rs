//! Per-request orchestration state.

use tccommon::{GenerationOptions, SessionId};
use tcprovider::{Message, ModelRequest, ProviderError, TokenUsage, ToolDefinition};
use tctooling::{CallDeduplicator, ToolExecutionContext};

/// Everything one orchestration run owns: the model target, the growing
/// conversation, the dedup set, the step counter, and the usage so far.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub model: String,
    pub system_prompt: Option<String>,
    pub conversation: Vec<Message>,
    pub options: GenerationOptions,
    pub dedup: CallDeduplicator,
    pub step: u32,
    pub usage: TokenUsage,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, model: impl Into<String>, conversation: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            system_prompt: None,
            conversation,
            options: GenerationOptions::default(),
            dedup: CallDeduplicator::new(),
            step: 0,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tool_context(&self) -> ToolExecutionContext {
        ToolExecutionContext::new(self.id.clone()).with_metadata("model", self.model.clone())
    }

    pub fn record_usage(&mut self, usage: TokenUsage) {
        self.usage += usage;
    }

    /// Builds the endpoint request for the current conversation.
    pub fn model_request(
        &self,
        system_prompt: Option<String>,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        stream: bool,
    ) -> Result<ModelRequest, ProviderError> {
        let mut builder = ModelRequest::builder(self.model.clone())
            .messages(messages)
            .options(self.options)
            .tools(tools)
            .metadata("session_id", self.id.as_str())
            .streaming(stream);
        if let Some(system_prompt) = system_prompt {
            builder = builder.system_prompt(system_prompt);
        }
        builder.build()
    }
}
