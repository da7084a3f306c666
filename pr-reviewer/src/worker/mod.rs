//! Job lifecycle: the state machine driving one review job end to end.
//!
//! Per job, strictly in order:
//! 1) load the job row — a missing job is skipped silently (deleted while
//!    queued is not an error);
//! 2) for GitHub-sourced jobs without a diff snapshot, fetch the diff from
//!    the provider and persist it — missing/unparsable PR metadata or a
//!    fetch failure fails the job before any pipeline work;
//! 3) mark `running` and invoke the orchestrator;
//! 4) upsert the single result row, mark `completed`;
//! 5) best-effort comment sync — failures here are logged, never unwind the
//!    already-committed job state.
//!
//! Any error between steps 2 and 4 commits `failed` on the job row and then
//! propagates upward for operational visibility. Replays of terminal jobs
//! run fresh and overwrite the prior result.

use tracing::{debug, error, info, warn};

use review_store::ReviewStore;
use review_store::types::{JobStatus, ReviewJob, ReviewSource};

use crate::errors::{Error, PrResult};
use crate::github::GitHubClient;
use crate::model::ReviewPayload;
use crate::pipeline::Orchestrator;
use crate::publish::sync::{SyncConfig, sync_review_to_github};

/// Everything a worker needs to process jobs. Constructed once at startup
/// and shared across worker tasks.
#[derive(Debug)]
pub struct WorkerContext {
    pub store: ReviewStore,
    pub github: GitHubClient,
    pub orchestrator: Orchestrator,
    pub sync: SyncConfig,
}

/// Drive a single review job to a terminal state.
///
/// # Errors
/// Re-raises the failure that moved the job to `failed`, after the status
/// has been committed. A job id that no longer exists is not an error.
pub async fn process_review_job(ctx: &WorkerContext, job_id: &str) -> PrResult<()> {
    let Some(job) = ctx.store.get_job(job_id).await else {
        warn!(job_id, "review job no longer exists; skipping");
        return Ok(());
    };

    match run_job(ctx, job).await {
        Ok(()) => Ok(()),
        Err(err) => {
            error!(job_id, error = %err, "review job failed");
            if let Err(store_err) = ctx.store.set_status(job_id, JobStatus::Failed).await {
                error!(job_id, error = %store_err, "could not mark job as failed");
            }
            Err(err)
        }
    }
}

async fn run_job(ctx: &WorkerContext, mut job: ReviewJob) -> PrResult<()> {
    // Webhook-sourced jobs may arrive without a diff; fetch it before the
    // pipeline runs so every later stage sees the same snapshot.
    if job.source == ReviewSource::Github && job.diff_snapshot.is_none() {
        let diff = fetch_github_diff(ctx, &job).await?;
        ctx.store.set_diff_snapshot(&job.id, diff.clone()).await?;
        job.diff_snapshot = Some(diff);
    }

    ctx.store.set_status(&job.id, JobStatus::Running).await?;
    debug!(job_id = %job.id, "job running");

    let outcome = ctx.orchestrator.run(job.diff_snapshot.as_deref()).await?;
    info!(
        job_id = %job.id,
        findings = outcome.findings.len(),
        files = outcome.run.files_reviewed,
        "pipeline finished"
    );

    let payload = ReviewPayload {
        comments: outcome.findings.clone(),
        metadata: outcome.run.clone(),
    };
    let serialized = serde_json::to_string(&payload)?;
    ctx.store
        .upsert_result(&job.id, outcome.summary.clone(), serialized)
        .await?;
    ctx.store.set_status(&job.id, JobStatus::Completed).await?;
    info!(job_id = %job.id, "job completed");

    // The job is committed as completed; sync failures only log.
    sync_review_to_github(
        &ctx.sync,
        &ctx.github,
        &job,
        &outcome.summary,
        &outcome.findings,
        &outcome.run,
    )
    .await;

    Ok(())
}

async fn fetch_github_diff(ctx: &WorkerContext, job: &ReviewJob) -> PrResult<String> {
    let (Some(repo), Some(pr_raw)) = (job.repo.as_deref(), job.pr_number.as_deref()) else {
        return Err(Error::Validation(format!(
            "github job {} is missing repo/pr metadata",
            job.id
        )));
    };
    let pr_number: u64 = pr_raw.parse().map_err(|_| {
        Error::Validation(format!(
            "github job {} has an unparsable PR number: {pr_raw}",
            job.id
        ))
    })?;

    debug!(job_id = %job.id, repo, pr = pr_number, "fetching pull request diff");
    ctx.github.fetch_pr_diff(repo, pr_number).await
}
