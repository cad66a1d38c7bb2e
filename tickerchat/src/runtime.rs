//! Runtime wiring: resolves a model and credentials into a ready chat service.

use std::sync::Arc;

use crate::{
    ChatError, ChatEventStream, ChatId, ChatLoopHooks, ChatPolicy, ChatRequest, ChatService,
    ChatStore, FinancialToolsetFactory, HttpProviderFactory, InMemoryChatStore, Message,
    ModelCatalog, ModelSpec, ProviderFactory, SafeChatLoopHooks, SecretString, ToolCallingMode,
    ToolsetFactory, TracingObservabilityHooks, UserId, delete_owned_chat,
};

/// Keys configured on the server. Requests may supply their own for GPT models
/// and for the financial data endpoint.
#[derive(Debug, Clone, Default)]
pub struct ServerKeys {
    pub inference: Option<SecretString>,
    pub openai: Option<SecretString>,
    pub financial: Option<SecretString>,
}

impl ServerKeys {
    pub fn with_inference(mut self, key: impl Into<SecretString>) -> Self {
        self.inference = non_empty(key.into());
        self
    }

    pub fn with_openai(mut self, key: impl Into<SecretString>) -> Self {
        self.openai = non_empty(key.into());
        self
    }

    pub fn with_financial(mut self, key: impl Into<SecretString>) -> Self {
        self.financial = non_empty(key.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestKeys {
    pub model_api_key: Option<SecretString>,
    pub financial_api_key: Option<SecretString>,
}

/// Which server-side keys exist. Never carries the keys themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfiguredKeys {
    pub inference: bool,
    pub openai: bool,
    pub financial: bool,
}

pub struct ChatRuntime {
    catalog: ModelCatalog,
    store: Arc<dyn ChatStore>,
    keys: ServerKeys,
    providers: Arc<dyn ProviderFactory>,
    toolsets: Arc<dyn ToolsetFactory>,
    mode: ToolCallingMode,
    policy: ChatPolicy,
    hooks: Arc<dyn ChatLoopHooks>,
}

impl ChatRuntime {
    pub fn new(keys: ServerKeys) -> Self {
        Self {
            catalog: ModelCatalog::builtin(),
            store: Arc::new(InMemoryChatStore::new()),
            keys,
            providers: Arc::new(HttpProviderFactory::new()),
            toolsets: Arc::new(FinancialToolsetFactory::new()),
            mode: ToolCallingMode::default(),
            policy: ChatPolicy::default(),
            hooks: Arc::new(SafeChatLoopHooks::new(TracingObservabilityHooks)),
        }
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_provider_factory(mut self, providers: Arc<dyn ProviderFactory>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_toolset_factory(mut self, toolsets: Arc<dyn ToolsetFactory>) -> Self {
        self.toolsets = toolsets;
        self
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

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn store(&self) -> Arc<dyn ChatStore> {
        Arc::clone(&self.store)
    }

    pub fn configured_keys(&self) -> ConfiguredKeys {
        ConfiguredKeys {
            inference: self.keys.inference.is_some(),
            openai: self.keys.openai.is_some(),
            financial: self.keys.financial.is_some(),
        }
    }

    pub fn resolve_model(&self, model_id: &str) -> Result<&ModelSpec, ChatError> {
        self.catalog
            .find(model_id)
            .ok_or_else(|| ChatError::not_found("Model not found"))
    }

    /// Builds a service for `model`, checking that the endpoint it lives on has a key.
    pub fn service_for(&self, model: &ModelSpec, keys: RequestKeys) -> Result<ChatService, ChatError> {
        let model_key = if model.requires_inference_key() {
            self.keys.inference.clone().ok_or_else(|| {
                ChatError::configuration("Heroku Inference API key is required for Claude models")
            })?
        } else {
            keys.model_api_key
                .and_then(non_empty)
                .or_else(|| self.keys.openai.clone())
                .ok_or_else(|| ChatError::configuration("OpenAI API key is required for GPT models"))?
        };

        let provider = self
            .providers
            .build(model, model_key)
            .map_err(|error| ChatError::configuration(error.message))?;
        let financial_key = keys
            .financial_api_key
            .and_then(non_empty)
            .or_else(|| self.keys.financial.clone());
        let tools = self.toolsets.build(financial_key);

        Ok(ChatService::new(provider, tools, Arc::clone(&self.store))
            .with_mode(self.mode)
            .with_policy(self.policy.clone())
            .with_hooks(Arc::clone(&self.hooks)))
    }

    /// Validates the model and keys, then starts the chat run.
    pub async fn stream_chat(
        &self,
        model_id: &str,
        keys: RequestKeys,
        chat_id: ChatId,
        user_id: UserId,
        messages: Vec<Message>,
    ) -> Result<ChatEventStream, ChatError> {
        let model = self.resolve_model(model_id)?;
        let service = self.service_for(model, keys)?;
        let request = ChatRequest::new(chat_id, user_id, model.api_identifier.clone(), messages);
        service.stream_chat(request).await
    }

    pub async fn delete_chat(&self, id: &ChatId, user_id: &UserId) -> Result<(), ChatError> {
        delete_owned_chat(self.store.as_ref(), id, user_id).await
    }
}

fn non_empty(key: SecretString) -> Option<SecretString> {
    (!key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures_util::StreamExt;

    use crate::{
        BoxedEventStream, ChatErrorKind, ChatEvent, DefaultToolRuntime, FinishReason,
        ModelRequest, ModelResponse, OutputItem, ProviderError, ProviderFuture, ProviderId,
        StreamEvent, TokenUsage, ToolRegistry, ToolRuntime, VecEventStream,
    };

    use super::*;

    #[derive(Debug)]
    struct FixedProvider;

    impl FixedProvider {
        fn response(request: &ModelRequest) -> ModelResponse {
            ModelResponse {
                provider: ProviderId::HerokuInference,
                model: request.model.clone(),
                output: vec![OutputItem::Message(Message::assistant("AAPL closed at 190."))],
                finish_reason: FinishReason::Stop,
                usage: TokenUsage {
                    prompt_tokens: 4,
                    completion_tokens: 5,
                    total_tokens: 9,
                },
            }
        }
    }

    impl crate::ModelProvider for FixedProvider {
        fn id(&self) -> ProviderId {
            ProviderId::HerokuInference
        }

        fn complete<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move { Ok(Self::response(&request)) })
        }

        fn stream<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
            Box::pin(async move {
                let response = Self::response(&request);
                let stream = VecEventStream::new(vec![
                    Ok(StreamEvent::TextDelta(response.text())),
                    Ok(StreamEvent::ResponseComplete(response)),
                ]);
                Ok(Box::pin(stream) as BoxedEventStream<'a>)
            })
        }
    }

    #[derive(Default)]
    struct RecordingProviderFactory {
        builds: Mutex<Vec<(String, String)>>,
    }

    impl ProviderFactory for RecordingProviderFactory {
        fn build(
            &self,
            model: &ModelSpec,
            api_key: SecretString,
        ) -> Result<Arc<dyn crate::ModelProvider>, ProviderError> {
            self.builds
                .lock()
                .expect("builds lock")
                .push((model.id.clone(), api_key.expose().to_string()));
            Ok(Arc::new(FixedProvider))
        }
    }

    #[derive(Default)]
    struct RecordingToolsetFactory {
        keys: Mutex<Vec<Option<String>>>,
    }

    impl ToolsetFactory for RecordingToolsetFactory {
        fn build(&self, api_key: Option<SecretString>) -> Arc<dyn ToolRuntime> {
            self.keys
                .lock()
                .expect("keys lock")
                .push(api_key.map(|key| key.expose().to_string()));
            Arc::new(DefaultToolRuntime::new(Arc::new(ToolRegistry::new())))
        }
    }

    fn wired_runtime(
        keys: ServerKeys,
    ) -> (
        ChatRuntime,
        Arc<RecordingProviderFactory>,
        Arc<RecordingToolsetFactory>,
    ) {
        let providers = Arc::new(RecordingProviderFactory::default());
        let toolsets = Arc::new(RecordingToolsetFactory::default());
        let runtime = ChatRuntime::new(keys)
            .with_provider_factory(providers.clone())
            .with_toolset_factory(toolsets.clone());
        (runtime, providers, toolsets)
    }

    fn claude_model(runtime: &ChatRuntime) -> ModelSpec {
        runtime
            .catalog()
            .list()
            .into_iter()
            .find(|model| model.requires_inference_key())
            .cloned()
            .expect("catalog carries a Claude model")
    }

    fn gpt_model(runtime: &ChatRuntime) -> ModelSpec {
        runtime
            .catalog()
            .list()
            .into_iter()
            .find(|model| !model.requires_inference_key())
            .cloned()
            .expect("catalog carries a GPT model")
    }

    #[test]
    fn unknown_models_are_not_found() {
        let (runtime, _, _) = wired_runtime(ServerKeys::default());
        let error = runtime.resolve_model("llama-9000").expect_err("unknown model");
        assert_eq!(error.kind, ChatErrorKind::NotFound);
        assert_eq!(error.message, "Model not found");
    }

    #[test]
    fn claude_models_need_the_server_inference_key() {
        let (runtime, _, _) = wired_runtime(ServerKeys::default().with_openai("sk-server"));
        let model = claude_model(&runtime);
        let keys = RequestKeys {
            model_api_key: Some(SecretString::new("sk-client")),
            financial_api_key: None,
        };

        let error = match runtime.service_for(&model, keys) {
            Ok(_) => panic!("missing inference key should fail"),
            Err(error) => error,
        };
        assert_eq!(error.kind, ChatErrorKind::Configuration);
        assert_eq!(error.message, "Heroku Inference API key is required for Claude models");
    }

    #[test]
    fn gpt_models_prefer_the_request_key_then_the_server_key() {
        let (runtime, providers, _) = wired_runtime(ServerKeys::default().with_openai("sk-server"));
        let model = gpt_model(&runtime);

        let with_client_key = RequestKeys {
            model_api_key: Some(SecretString::new("sk-client")),
            financial_api_key: None,
        };
        assert!(runtime.service_for(&model, with_client_key).is_ok());
        assert!(runtime.service_for(&model, RequestKeys::default()).is_ok());

        let builds = providers.builds.lock().expect("builds lock").clone();
        assert_eq!(builds[0].1, "sk-client");
        assert_eq!(builds[1].1, "sk-server");

        let (bare, _, _) = wired_runtime(ServerKeys::default());
        let error = match bare.service_for(&model, RequestKeys::default()) {
            Ok(_) => panic!("missing OpenAI key should fail"),
            Err(error) => error,
        };
        assert_eq!(error.message, "OpenAI API key is required for GPT models");
    }

    #[test]
    fn financial_key_falls_back_to_the_server_key() {
        let (runtime, _, toolsets) = wired_runtime(
            ServerKeys::default()
                .with_inference("inf-key")
                .with_financial("fd-server"),
        );
        let model = claude_model(&runtime);

        let request_keys = RequestKeys {
            model_api_key: None,
            financial_api_key: Some(SecretString::new("fd-client")),
        };
        assert!(runtime.service_for(&model, request_keys).is_ok());
        let blank_request_key = RequestKeys {
            model_api_key: None,
            financial_api_key: Some(SecretString::new("")),
        };
        assert!(runtime.service_for(&model, blank_request_key).is_ok());

        let keys = toolsets.keys.lock().expect("keys lock").clone();
        assert_eq!(
            keys,
            vec![Some("fd-client".to_string()), Some("fd-server".to_string())]
        );
    }

    #[test]
    fn configured_keys_report_presence_only() {
        let (runtime, _, _) = wired_runtime(ServerKeys::default().with_inference("inf").with_openai(""));
        assert_eq!(
            runtime.configured_keys(),
            ConfiguredKeys {
                inference: true,
                openai: false,
                financial: false,
            }
        );
    }

    #[tokio::test]
    async fn stream_chat_runs_against_the_catalog_identifier() {
        let (runtime, _, _) = wired_runtime(ServerKeys::default().with_inference("inf-key"));
        let model = claude_model(&runtime);
        let user = UserId::new("user-1");

        let events = runtime
            .stream_chat(
                &model.id,
                RequestKeys::default(),
                ChatId::new("chat-1"),
                user.clone(),
                vec![Message::user("How did AAPL close?")],
            )
            .await
            .expect("chat starts")
            .collect::<Vec<_>>()
            .await;

        assert!(matches!(events.first(), Some(ChatEvent::UserMessageId(_))));
        assert!(events.iter().any(|event| matches!(
            event,
            ChatEvent::TextDelta(text) if text == "AAPL closed at 190."
        )));
        assert!(events.last().is_some_and(ChatEvent::is_finish));

        let chat = runtime
            .store()
            .get_chat(&ChatId::new("chat-1"))
            .await
            .expect("store read")
            .expect("chat saved");
        assert_eq!(chat.user_id, user);

        let stranger = UserId::new("user-2");
        let error = runtime
            .delete_chat(&ChatId::new("chat-1"), &stranger)
            .await
            .expect_err("only the owner deletes");
        assert_eq!(error.kind, ChatErrorKind::Unauthorized);
        runtime
            .delete_chat(&ChatId::new("chat-1"), &user)
            .await
            .expect("owner deletes");
    }
}
