//! Best-effort mirroring of a finished review onto the pull request.
//!
//! Runs strictly after the result row is committed. Nothing in here may
//! fail the job: every error path degrades to a log line, and an inline
//! submission that is rejected falls back to a single aggregate comment
//! built from the full finding list.

use tracing::{debug, info, warn};

use review_store::types::{ReviewJob, ReviewSource};

use super::{build_inline_review_comments, build_summary_body};
use crate::github::GitHubClient;
use crate::model::{Finding, PipelineRun};

/// Knobs for the comment-sync stage.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Master switch; disabled means reviews stay internal.
    pub enabled: bool,
    /// Upper bound on inline comments per review submission.
    pub max_inline: usize,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let enabled = std::env::var("GITHUB_COMMENT_SYNC_ENABLED")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let max_inline = std::env::var("GITHUB_COMMENT_MAX_INLINE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        Self {
            enabled,
            max_inline,
        }
    }
}

/// Mirror a completed review onto GitHub.
///
/// Skips silently unless sync is enabled, the job came from GitHub, and the
/// repo + PR number are present and numeric. Inline comments are anchored
/// against the job's diff snapshot; if the inline submission fails or there
/// is nothing to anchor, a single aggregate comment carries the full
/// finding list instead.
pub async fn sync_review_to_github(
    cfg: &SyncConfig,
    client: &GitHubClient,
    job: &ReviewJob,
    summary: &str,
    findings: &[Finding],
    metadata: &PipelineRun,
) {
    if !cfg.enabled || job.source != ReviewSource::Github {
        return;
    }

    let (Some(repo), Some(pr_raw)) = (job.repo.as_deref(), job.pr_number.as_deref()) else {
        debug!(job_id = %job.id, "skipping GitHub sync: missing repo/pr metadata");
        return;
    };
    let Ok(pr_number) = pr_raw.parse::<u64>() else {
        warn!(job_id = %job.id, pr_number = pr_raw, "skipping GitHub sync: invalid PR number");
        return;
    };

    let (inline, remainder) =
        build_inline_review_comments(findings, job.diff_snapshot.as_deref(), cfg.max_inline);

    if !inline.is_empty() {
        let list_cap = if cfg.max_inline > 0 {
            cfg.max_inline
        } else {
            remainder.len()
        };
        let summary_body = build_summary_body(
            Some(summary),
            &remainder,
            list_cap,
            Some(metadata),
            inline.len(),
            findings.len(),
        );

        match client
            .post_review(repo, pr_number, &summary_body, &inline)
            .await
        {
            Ok(true) => {
                info!(
                    job_id = %job.id,
                    repo,
                    pr = pr_number,
                    inline = inline.len(),
                    "review synced with inline comments"
                );
                return;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "inline review submission failed");
            }
        }
    }

    // Fallback: one aggregate comment built from the full finding list.
    let list_cap = if cfg.max_inline > 0 {
        cfg.max_inline
    } else {
        findings.len()
    };
    let fallback_body = build_summary_body(
        Some(summary),
        findings,
        list_cap,
        Some(metadata),
        0,
        findings.len(),
    );
    match client
        .post_issue_comment(repo, pr_number, &fallback_body)
        .await
    {
        Ok(()) => info!(job_id = %job.id, repo, pr = pr_number, "review summary comment synced"),
        Err(err) => {
            warn!(job_id = %job.id, error = %err, "failed to post aggregate review comment");
        }
    }
}
