//! Asynchronous PR review pipeline.
//!
//! One review job flows through these stages:
//!
//! 1) **Lifecycle + lazy diff fetch** — the worker loads the job row,
//!    fetches the diff from the code host for webhook-sourced jobs, and
//!    advances the status machine (`pending → running → completed|failed`).
//!
//! 2) **Strategy run** — one of three interchangeable orchestrators turns
//!    the diff into a summary, findings, and run metadata: a canned stub,
//!    the heuristic analyzer set (diff parser + four independent checks),
//!    or a remote-model-backed reviewer.
//!
//! 3) **Result persistence** — findings + metadata serialize into the
//!    single result row for the job (upsert; replays overwrite).
//!
//! 4) **Best-effort comment sync** — eligible findings become inline
//!    review comments anchored against the diff's post-change lines, the
//!    rest fold into a rendered summary body; failures never touch the
//!    committed job state.
//!
//! The crate uses `tracing` for structured logs and avoids `async-trait`
//! and heap trait objects: strategies, analyzers, and model providers all
//! dispatch through enums.

pub mod analyzers;
pub mod errors;
pub mod github;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod publish;
pub mod worker;

pub use errors::{Error, PrResult};
pub use model::{Finding, PipelineRun, ReviewPayload};
pub use pipeline::{Orchestrator, PipelineOutcome};
pub use worker::{WorkerContext, process_review_job};
