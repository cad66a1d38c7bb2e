//! Credential helpers and auth resolution for chat-completions endpoints.

use crate::{ProviderError, ProviderId, SecretString, SecureCredentialManager};

use super::types::OpenAiAuth;

impl SecureCredentialManager {
    /// Stores an OpenAI API key. OpenAI keys are expected to start with `sk-`.
    pub fn set_openai_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.starts_with("sk-") {
            return Err(ProviderError::authentication(
                "OpenAI API key must start with 'sk-'",
            ));
        }

        self.set_api_key(ProviderId::OpenAi, api_key)
    }

    /// Stores the hosted inference key used for Claude models.
    pub fn set_inference_api_key(
        &self,
        api_key: impl Into<SecretString>,
    ) -> Result<(), ProviderError> {
        self.set_api_key(ProviderId::HerokuInference, api_key)
    }
}

pub(crate) fn resolve_auth(
    credentials: &SecureCredentialManager,
    provider: ProviderId,
) -> Result<OpenAiAuth, ProviderError> {
    if let Some(api_key) = credentials.api_key(provider)? {
        return Ok(OpenAiAuth::ApiKey(api_key));
    }

    Err(ProviderError::authentication(format!(
        "no API key configured for {provider}"
    )))
}
