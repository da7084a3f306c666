//! Persistence collaborator for review jobs and results.
//!
//! The relational engine itself is out of scope for this backend; this crate
//! pins down the store contract the pipeline depends on and ships the
//! in-memory table used by wiring and tests:
//! - jobs are inserted in `pending` and mutated only through status setters,
//! - every mutation commits on its own and touches `updated_at`,
//! - at most one result row exists per job id (`upsert_result` overwrites).
//!
//! The handle is cheap to clone and safe to share across worker tasks.

pub mod errors;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use errors::{Result, StoreError};
use types::{JobStatus, ReviewJob, ReviewResult, ReviewSource};

#[derive(Debug, Default)]
struct Tables {
    jobs: HashMap<String, ReviewJob>,
    results: HashMap<String, ReviewResult>,
}

/// Cloneable handle to the job/result tables.
#[derive(Debug, Clone, Default)]
pub struct ReviewStore {
    inner: Arc<RwLock<Tables>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job in `pending` and return the stored row.
    ///
    /// # Errors
    /// [`StoreError::MissingDiff`] if `source` is manual and no diff text
    /// was provided.
    pub async fn create_job(
        &self,
        source: ReviewSource,
        diff: Option<String>,
        repo: Option<String>,
        pr_number: Option<String>,
    ) -> Result<ReviewJob> {
        if source == ReviewSource::Manual && diff.as_deref().is_none_or(|d| d.is_empty()) {
            return Err(StoreError::MissingDiff);
        }

        let now = Utc::now();
        let job = ReviewJob {
            id: Uuid::new_v4().to_string(),
            source,
            status: JobStatus::Pending,
            diff_snapshot: diff,
            repo,
            pr_number,
            created_at: now,
            updated_at: now,
        };

        self.inner
            .write()
            .await
            .jobs
            .insert(job.id.clone(), job.clone());
        debug!(job_id = %job.id, source = source.as_str(), "review job created");
        Ok(job)
    }

    /// Fetch a job row by id. `None` means the job was deleted externally.
    pub async fn get_job(&self, id: &str) -> Option<ReviewJob> {
        self.inner.read().await.jobs.get(id).cloned()
    }

    /// Advance the job to `status`, touching `updated_at`.
    pub async fn set_status(&self, id: &str, status: JobStatus) -> Result<()> {
        let mut tables = self.inner.write().await;
        let job = tables
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;
        job.status = status;
        job.updated_at = Utc::now();
        debug!(job_id = id, status = status.as_str(), "job status updated");
        Ok(())
    }

    /// Persist a lazily fetched diff snapshot on the job row.
    pub async fn set_diff_snapshot(&self, id: &str, diff: String) -> Result<()> {
        let mut tables = self.inner.write().await;
        let job = tables
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;
        job.diff_snapshot = Some(diff);
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Create-or-overwrite the single result row for `job_id`.
    ///
    /// Replaying a job must not duplicate results, so an existing row is
    /// replaced wholesale (fresh `created_at` included).
    pub async fn upsert_result(
        &self,
        job_id: &str,
        summary: String,
        payload: String,
    ) -> Result<ReviewResult> {
        let mut tables = self.inner.write().await;
        if !tables.jobs.contains_key(job_id) {
            return Err(StoreError::JobNotFound(job_id.to_string()));
        }
        let result = ReviewResult {
            job_id: job_id.to_string(),
            summary,
            payload,
            created_at: Utc::now(),
        };
        tables.results.insert(job_id.to_string(), result.clone());
        debug!(job_id, "review result upserted");
        Ok(result)
    }

    /// Fetch the result row for a job, if the job has finished at least once.
    pub async fn get_result(&self, job_id: &str) -> Option<ReviewResult> {
        self.inner.read().await.results.get(job_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_job_requires_diff() {
        let store = ReviewStore::new();
        let err = store
            .create_job(ReviewSource::Manual, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingDiff));

        let err = store
            .create_job(ReviewSource::Manual, Some(String::new()), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingDiff));
    }

    #[tokio::test]
    async fn github_job_may_defer_diff() {
        let store = ReviewStore::new();
        let job = store
            .create_job(
                ReviewSource::Github,
                None,
                Some("octo/demo".into()),
                Some("7".into()),
            )
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.diff_snapshot.is_none());

        store
            .set_diff_snapshot(&job.id, "diff --git a/x b/x".into())
            .await
            .unwrap();
        let reloaded = store.get_job(&job.id).await.unwrap();
        assert!(reloaded.diff_snapshot.is_some());
    }

    #[tokio::test]
    async fn status_transitions_touch_updated_at() {
        let store = ReviewStore::new();
        let job = store
            .create_job(ReviewSource::Manual, Some("diff".into()), None, None)
            .await
            .unwrap();

        store.set_status(&job.id, JobStatus::Running).await.unwrap();
        let reloaded = store.get_job(&job.id).await.unwrap();
        assert_eq!(reloaded.status, JobStatus::Running);
        assert!(reloaded.updated_at >= job.updated_at);

        let missing = store.set_status("nope", JobStatus::Failed).await;
        assert!(matches!(missing, Err(StoreError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn upsert_result_overwrites_single_row() {
        let store = ReviewStore::new();
        let job = store
            .create_job(ReviewSource::Manual, Some("diff".into()), None, None)
            .await
            .unwrap();

        store
            .upsert_result(&job.id, "first".into(), "{}".into())
            .await
            .unwrap();
        store
            .upsert_result(&job.id, "second".into(), "{}".into())
            .await
            .unwrap();

        let result = store.get_result(&job.id).await.unwrap();
        assert_eq!(result.summary, "second");
    }
}
