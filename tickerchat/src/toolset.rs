//! Factories that turn per-request credentials into providers and tool runtimes.

use std::sync::Arc;
use std::time::Duration;

use crate::tcmarket::{DEFAULT_FETCH_TIMEOUT, FINANCIAL_DATASETS_BASE_URL, FetchClient, financial_registry};
use crate::{
    DefaultToolRuntime, ModelProvider, ModelSpec, ProviderBuildConfig, ProviderError, SafeToolHooks,
    SecretString, ToolRuntime, ToolRuntimeHooks, TracingObservabilityHooks,
    build_provider_with_config,
};

pub trait ProviderFactory: Send + Sync {
    fn build(
        &self,
        model: &ModelSpec,
        api_key: SecretString,
    ) -> Result<Arc<dyn ModelProvider>, ProviderError>;
}

/// Builds chat-completions providers over HTTP, one base URL per endpoint.
#[derive(Debug, Clone, Default)]
pub struct HttpProviderFactory {
    inference_url: Option<String>,
    openai_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = Some(url.into());
        self
    }

    pub fn with_openai_url(mut self, url: impl Into<String>) -> Self {
        self.openai_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(
        &self,
        model: &ModelSpec,
        api_key: SecretString,
    ) -> Result<Arc<dyn ModelProvider>, ProviderError> {
        let mut config = ProviderBuildConfig::new(model.provider, api_key);
        let base_url = if model.requires_inference_key() {
            &self.inference_url
        } else {
            &self.openai_url
        };
        if let Some(base_url) = base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        build_provider_with_config(config)
    }
}

pub trait ToolsetFactory: Send + Sync {
    fn build(&self, api_key: Option<SecretString>) -> Arc<dyn ToolRuntime>;
}

/// Registers the seven financial data tools against one fetch client.
#[derive(Clone)]
pub struct FinancialToolsetFactory {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for FinancialToolsetFactory {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: FINANCIAL_DATASETS_BASE_URL.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            hooks: Arc::new(SafeToolHooks::new(TracingObservabilityHooks)),
        }
    }
}

impl FinancialToolsetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every toolset built by this factory fetches through `http`.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }
}

impl ToolsetFactory for FinancialToolsetFactory {
    fn build(&self, api_key: Option<SecretString>) -> Arc<dyn ToolRuntime> {
        let api_key = api_key.unwrap_or_else(|| {
            tracing::warn!("no financial data API key configured; tool calls will fail upstream");
            SecretString::new("")
        });
        let client = FetchClient::with_client(self.http.clone(), api_key)
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout);
        let registry = financial_registry(Arc::new(client));
        Arc::new(DefaultToolRuntime::new(Arc::new(registry)).with_hooks(Arc::clone(&self.hooks)))
    }
}
