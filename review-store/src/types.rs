//! Persisted records for review jobs and their results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a review request originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    /// Raw diff submitted directly by a user.
    Manual,
    /// Pull-request webhook; the diff may be fetched lazily.
    Github,
}

impl ReviewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Github => "github",
        }
    }
}

/// Job lifecycle states. `Completed` and `Failed` are terminal: the worker
/// never advances a job out of them; only a fresh run request replays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One review job row.
///
/// Owned by the store; the worker holds a copy only for the duration of a
/// single processing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewJob {
    pub id: String,
    pub source: ReviewSource,
    pub status: JobStatus,
    /// Unified diff text. Always present for manual jobs; populated during
    /// processing for webhook-sourced jobs.
    pub diff_snapshot: Option<String>,
    /// "owner/repo" identifier when the job came from a code host.
    pub repo: Option<String>,
    /// Pull-request number, kept as text and parsed at use-site.
    pub pr_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single result row attached to a finished job (unique per job id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub job_id: String,
    pub summary: String,
    /// Serialized findings + run metadata blob.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}
