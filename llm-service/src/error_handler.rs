//! Unified error handling for `llm-service`.
//!
//! One top-level [`LlmError`] for the whole crate, with domain-specific
//! sub-enums for configuration and provider failures.

use reqwest::StatusCode;
use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Top-level error for the `llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration/validation errors (startup time).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider protocol errors (bad status, undecodable payload).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error.
    #[error("[llm-service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/// Errors raised while reading or validating model configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unsupported value in `LLM_PROVIDER`.
    #[error("[llm-service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Endpoint is empty or does not start with http/https.
    #[error("[llm-service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Provider requires an API key and none was configured.
    #[error("[llm-service] missing API key for provider {0}")]
    MissingApiKey(&'static str),

    /// Model name was empty.
    #[error("[llm-service] model name must not be empty")]
    EmptyModel,
}

/// Errors reported by a provider after a request went out.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream returned a non-successful HTTP status.
    #[error("[llm-service] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("[llm-service] decode error: {0}")]
    Decode(String),

    /// The completion response carried no choices.
    #[error("[llm-service] empty choices in completion response")]
    EmptyChoices,
}

/// Shorten an upstream error body for logs and error messages.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 200;
    let trimmed = text.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
