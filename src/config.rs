//! Process-level configuration, read from the environment exactly once at
//! startup and passed by reference into component constructors.

use llm_service::LlmModelConfig;
use pr_reviewer::github::GithubConfig;
use pr_reviewer::publish::sync::SyncConfig;

/// Top-level configuration for the review backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Orchestrator mode: "stub", "llm", or anything else for heuristic.
    pub orchestrator_mode: String,
    /// Number of jobs processed concurrently by the worker pool.
    pub worker_concurrency: usize,
    pub github: GithubConfig,
    pub llm: LlmModelConfig,
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            orchestrator_mode: std::env::var("ORCHESTRATOR_MODE")
                .unwrap_or_else(|_| "heuristic".to_string()),
            worker_concurrency: std::env::var("WORKER_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            github: GithubConfig::from_env(),
            llm: LlmModelConfig::from_env()?,
            sync: SyncConfig::from_env(),
        })
    }
}
