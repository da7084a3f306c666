//! Crate-wide error hierarchy for pr-reviewer.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Provider-aware mapping (401→Unauthorized, 429→RateLimited, 5xx→Server, etc.).
//! - No dynamic dispatch, ergonomic `?` via `From` impls.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type PrResult<T> = Result<T, Error>;

/// Root error type for the pr-reviewer crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Code-host API related failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration problems (bad base URL, unusable token, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Persistence failure from the job/result store.
    #[error(transparent)]
    Store(#[from] review_store::errors::StoreError),

    /// Remote-model failure from the LLM-backed strategy.
    #[error(transparent)]
    Llm(#[from] llm_service::LlmError),

    /// Result payload (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Input validation errors (missing metadata, bad PR numbers, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Detailed code-host error used inside the provider layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status not covered above, with a body excerpt.
    #[error("http status error: {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),
}

/// Configuration and setup errors for provider clients.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),

    #[error("unusable provider token: {0}")]
    InvalidToken(String),
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(ProviderError::from(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => ProviderError::Unauthorized,
                403 => ProviderError::Forbidden,
                404 => ProviderError::NotFound,
                429 => ProviderError::RateLimited {
                    retry_after_secs: None,
                },
                500..=599 => ProviderError::Server(code),
                _ => ProviderError::HttpStatus {
                    status: code,
                    message: String::new(),
                },
            };
        }
        ProviderError::Network(e.to_string())
    }
}
