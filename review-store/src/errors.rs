//! Error types for the review store.

use thiserror::Error;

/// Convenient alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by job/result table operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced job id is not present in the jobs table.
    #[error("review job not found: {0}")]
    JobNotFound(String),

    /// Manual submissions must carry the diff text up front.
    #[error("manual review jobs must include a diff at creation")]
    MissingDiff,
}
