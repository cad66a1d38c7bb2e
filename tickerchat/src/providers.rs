//! Stable provider construction surface for facade consumers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{ModelProvider, ProviderError, ProviderId, SecretString, SecureCredentialManager};

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct ProviderBuildConfig {
    pub provider_id: ProviderId,
    pub api_key: SecretString,
    /// Overrides the endpoint root; `/v1` is appended when missing.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ProviderBuildConfig {
    pub fn new(provider_id: ProviderId, api_key: impl Into<SecretString>) -> Self {
        Self {
            provider_id,
            api_key: api_key.into(),
            base_url: None,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub fn build_provider_from_api_key(
    provider_id: ProviderId,
    api_key: impl Into<SecretString>,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    build_provider_with_config(ProviderBuildConfig::new(provider_id, api_key))
}

pub fn build_provider_with_config(
    config: ProviderBuildConfig,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    if config.api_key.expose().trim().is_empty() {
        return Err(ProviderError::authentication(
            "provider API key must not be empty",
        ));
    }

    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    build_chat_completions_provider(config, http)
}

/// Normalizes an endpoint root to the versioned chat-completions base.
pub fn versioned_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

#[cfg(feature = "provider-openai")]
fn build_chat_completions_provider(
    config: ProviderBuildConfig,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use crate::tcprovider::adapters::openai::{
        HEROKU_INFERENCE_BASE_URL, OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiProvider,
    };

    let credentials = Arc::new(SecureCredentialManager::new());
    let default_base = match config.provider_id {
        ProviderId::HerokuInference => {
            credentials.set_inference_api_key(config.api_key.expose())?;
            HEROKU_INFERENCE_BASE_URL
        }
        ProviderId::OpenAi => {
            credentials.set_openai_api_key(config.api_key.expose())?;
            OPENAI_BASE_URL
        }
    };
    let base_url = config
        .base_url
        .as_deref()
        .map(versioned_base_url)
        .unwrap_or_else(|| default_base.to_string());

    tracing::debug!(provider = %config.provider_id, base_url = %base_url, "building model provider");
    let transport = Arc::new(OpenAiHttpTransport::new(http).with_base_url(base_url));
    Ok(Arc::new(
        OpenAiProvider::new(credentials, transport).with_provider_id(config.provider_id),
    ))
}

#[cfg(not(feature = "provider-openai"))]
fn build_chat_completions_provider(
    _config: ProviderBuildConfig,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai feature is not enabled on tickerchat",
    ))
}
