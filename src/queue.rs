//! In-process work queue and worker pool.
//!
//! Stand-in for the durable queue transport: job ids go in, workers pull
//! them out and drive the lifecycle. Durability and at-least-once
//! redelivery belong to the real transport; the lifecycle itself already
//! tolerates replays (status re-commits, result upserts).

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info};

use pr_reviewer::worker::{WorkerContext, process_review_job};

/// Sender half handed to ingestion call sites.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl ReviewQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Hand a job id to the worker pool.
    pub fn enqueue(&self, job_id: String) {
        if self.tx.send(job_id).is_err() {
            error!("review queue is closed; job dropped");
        }
    }
}

/// Pull job ids until the queue closes, processing up to `concurrency`
/// jobs at a time. Each job runs independently; failures are committed and
/// logged by the lifecycle itself.
pub async fn run_workers(
    ctx: Arc<WorkerContext>,
    mut jobs: mpsc::UnboundedReceiver<String>,
    concurrency: usize,
) {
    let sem = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(job_id) = jobs.recv().await {
        let Ok(permit) = sem.clone().acquire_owned().await else {
            break;
        };
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let _permit = permit;
            let _ = process_review_job(&ctx, &job_id).await;
        });
    }

    info!("review queue closed; worker pool draining");
}
