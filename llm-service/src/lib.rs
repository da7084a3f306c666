//! Remote-model client facade without async-trait or trait objects.
//!
//! A single enum [`LlmService`] dispatches to concrete provider services
//! (OpenAI or the deterministic mock). Every provider satisfies the same
//! contract: `generate(system, user)` returns the reply content plus token
//! usage and client-measured latency.

pub mod config;
pub mod error_handler;
pub mod services;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{LlmError, Result};
pub use services::{mock_service::MockLlmService, open_ai_service::OpenAiService};

/// One non-streaming completion, with the counters the caller reports in
/// run metadata.
#[derive(Debug, Clone)]
pub struct LlmReply {
    pub content: String,
    pub tokens_prompt: u64,
    pub tokens_completion: u64,
    pub latency_ms: f64,
}

/// Concrete model client (enum-dispatch).
#[derive(Debug, Clone)]
pub enum LlmService {
    Mock(MockLlmService),
    OpenAi(OpenAiService),
}

impl LlmService {
    /// Constructs a concrete client from generic config.
    pub fn from_config(cfg: LlmModelConfig) -> Result<Self> {
        Ok(match cfg.provider {
            LlmProvider::Mock => Self::Mock(MockLlmService::new()),
            LlmProvider::OpenAi => Self::OpenAi(OpenAiService::new(cfg)?),
        })
    }

    /// Run one completion with a system + user prompt pair.
    pub async fn generate(&self, system: &str, user: &str) -> Result<LlmReply> {
        match self {
            Self::Mock(s) => s.generate(system, user).await,
            Self::OpenAi(s) => s.generate(system, user).await,
        }
    }
}
