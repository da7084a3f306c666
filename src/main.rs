use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod config;
mod queue;

use config::AppConfig;
use pr_reviewer::github::GitHubClient;
use pr_reviewer::pipeline::Orchestrator;
use pr_reviewer::worker::WorkerContext;
use review_store::ReviewStore;
use review_store::types::ReviewSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env when present (local development).
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pr_reviewer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cfg = AppConfig::from_env()?;
    tracing::info!(
        mode = %cfg.orchestrator_mode,
        workers = cfg.worker_concurrency,
        sync_enabled = cfg.sync.enabled,
        "starting review backend"
    );

    let store = ReviewStore::new();
    let github = GitHubClient::new(&cfg.github)?;
    let orchestrator = Orchestrator::from_mode(&cfg.orchestrator_mode, &cfg.llm)?;

    let ctx = Arc::new(WorkerContext {
        store,
        github,
        orchestrator,
        sync: cfg.sync.clone(),
    });

    // Ingestion (HTTP handlers, webhook receivers) holds clones of this
    // handle; the copy here keeps the channel open until shutdown.
    let (ingest, jobs) = queue::ReviewQueue::new();

    // Local smoke path: submit one manual job from a diff file on disk.
    if let Ok(path) = std::env::var("SUBMIT_DIFF_PATH") {
        let diff = std::fs::read_to_string(&path)?;
        let job = ctx
            .store
            .create_job(ReviewSource::Manual, Some(diff), None, None)
            .await?;
        tracing::info!(job_id = %job.id, path, "submitted manual review job");
        ingest.enqueue(job.id);
    }

    tokio::select! {
        _ = queue::run_workers(ctx, jobs, cfg.worker_concurrency) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
