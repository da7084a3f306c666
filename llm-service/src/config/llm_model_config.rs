use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{ConfigError, Result};

/// Configuration for a single model endpoint.
///
/// Provider-specific validation happens in the service constructors; this
/// struct only carries the values.
#[derive(Debug, Clone)]
pub struct LlmModelConfig {
    /// Which backend to talk to.
    pub provider: LlmProvider,

    /// Model identifier string (e.g. `"gpt-4o-mini"`).
    pub model: String,

    /// API base, e.g. "https://api.openai.com".
    pub endpoint: String,

    /// API key for providers that require authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Read the model configuration from the environment, once, at startup.
    ///
    /// Defaults keep local development network-free: the provider falls back
    /// to `mock` unless `LLM_PROVIDER` says otherwise.
    pub fn from_env() -> Result<Self> {
        let provider = LlmProvider::parse(
            &std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
        )?;
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let endpoint =
            std::env::var("LLM_ENDPOINT").unwrap_or_else(|_| "https://api.openai.com".to_string());
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok());
        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok());
        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        if model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            max_tokens,
            temperature,
            timeout_secs,
        })
    }
}
