//! Server configuration from flags and environment.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tickerchat::tcmarket::FINANCIAL_DATASETS_BASE_URL;
use tickerchat::{
    ChatPolicy, ChatRuntime, FinancialToolsetFactory, HttpProviderFactory, SafeChatLoopHooks,
    ServerKeys, ToolCallingMode, TracingObservabilityHooks, parse_tool_mode,
};

pub const DEFAULT_INFERENCE_URL: &str = "https://us.inference.heroku.com";

#[derive(Clone, Parser)]
#[command(name = "tickerchat-server", version, about = "Financial chat assistant over HTTP")]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "TICKERCHAT_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Hosted inference key; required for Claude models.
    #[arg(long, env = "INFERENCE_KEY", hide_env_values = true)]
    pub inference_key: Option<String>,

    #[arg(long, env = "INFERENCE_URL", default_value = DEFAULT_INFERENCE_URL)]
    pub inference_url: String,

    /// Server-side OpenAI key, used when a request brings none.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "FINANCIAL_DATASETS_API_KEY", hide_env_values = true)]
    pub financial_datasets_api_key: Option<String>,

    #[arg(long, env = "FINANCIAL_DATASETS_URL", default_value = FINANCIAL_DATASETS_BASE_URL)]
    pub financial_datasets_url: String,

    /// Hard limit for a single financial data fetch.
    #[arg(long, default_value_t = 10_000)]
    pub fetch_timeout_ms: u64,

    #[arg(long, default_value_t = 90)]
    pub model_timeout_secs: u64,

    #[arg(long, default_value = "native", value_parser = tool_mode_arg)]
    pub tool_mode: ToolCallingMode,

    /// Model rounds allowed per request in native mode.
    #[arg(long, default_value_t = 10)]
    pub max_steps: u32,

    /// Generate the final answer in one piece instead of streaming deltas.
    #[arg(long)]
    pub no_stream: bool,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl ServerConfig {
    pub fn server_keys(&self) -> ServerKeys {
        let mut keys = ServerKeys::default();
        if let Some(key) = &self.inference_key {
            keys = keys.with_inference(key.as_str());
        }
        if let Some(key) = &self.openai_api_key {
            keys = keys.with_openai(key.as_str());
        }
        if let Some(key) = &self.financial_datasets_api_key {
            keys = keys.with_financial(key.as_str());
        }
        keys
    }

    pub fn policy(&self) -> ChatPolicy {
        ChatPolicy::default()
            .with_max_steps(self.max_steps)
            .with_streaming(!self.no_stream)
    }

    /// Wires the chat runtime this configuration describes.
    pub fn runtime(&self) -> ChatRuntime {
        let mut providers = HttpProviderFactory::new()
            .with_inference_url(self.inference_url.clone())
            .with_timeout(Duration::from_secs(self.model_timeout_secs));
        if let Some(openai_base_url) = &self.openai_base_url {
            providers = providers.with_openai_url(openai_base_url.clone());
        }
        let toolsets = FinancialToolsetFactory::new()
            .with_base_url(self.financial_datasets_url.clone())
            .with_timeout(Duration::from_millis(self.fetch_timeout_ms));

        ChatRuntime::new(self.server_keys())
            .with_provider_factory(Arc::new(providers))
            .with_toolset_factory(Arc::new(toolsets))
            .with_mode(self.tool_mode)
            .with_policy(self.policy())
            .with_hooks(Arc::new(SafeChatLoopHooks::new(TracingObservabilityHooks)))
    }
}

fn tool_mode_arg(value: &str) -> Result<ToolCallingMode, String> {
    parse_tool_mode(value).ok_or_else(|| format!("unknown tool mode '{value}', expected native or prompt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = ServerConfig::try_parse_from(["tickerchat-server"]).expect("defaults parse");

        assert_eq!(config.bind, "0.0.0.0:3000".parse::<SocketAddr>().expect("addr"));
        assert_eq!(config.inference_url, DEFAULT_INFERENCE_URL);
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert_eq!(config.model_timeout_secs, 90);
        assert_eq!(config.tool_mode, ToolCallingMode::Native);
        assert_eq!(config.policy().max_steps, 10);
        assert!(config.policy().stream);
    }

    #[test]
    fn flags_override_mode_and_streaming() {
        let config = ServerConfig::try_parse_from([
            "tickerchat-server",
            "--tool-mode",
            "prompt",
            "--no-stream",
            "--max-steps",
            "4",
            "--inference-key",
            "inf-key",
        ])
        .expect("flags parse");

        assert_eq!(config.tool_mode, ToolCallingMode::Prompt);
        assert!(!config.policy().stream);
        assert_eq!(config.policy().max_steps, 4);
        assert!(config.runtime().configured_keys().inference);
    }

    #[test]
    fn unknown_tool_modes_are_rejected() {
        assert!(ServerConfig::try_parse_from(["tickerchat-server", "--tool-mode", "auto"]).is_err());
    }
}
