//! Review orchestration strategies.
//!
//! Three interchangeable strategies satisfy the same contract — take an
//! optional diff, return a summary, findings, and run metadata:
//! - **Stub**: canned output, used for smoke runs and wiring checks.
//! - **Heuristic**: parse the diff, run every analyzer, aggregate.
//! - **Llm**: remote-model-backed review (see [`llm`]).
//!
//! Strategy selection happens in exactly one place
//! ([`Orchestrator::from_mode`]); adding a strategy means adding an enum
//! variant and a match arm, not touching callers.

pub mod llm;

use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::default_analyzers;
use crate::errors::PrResult;
use crate::model::{Finding, PipelineRun};
use crate::parser::parse_unified_diff;
use llm::LlmOrchestrator;

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub summary: String,
    pub findings: Vec<Finding>,
    pub run: PipelineRun,
}

/// Interchangeable review strategies (enum-dispatch).
#[derive(Debug)]
pub enum Orchestrator {
    Stub(StubOrchestrator),
    Heuristic(HeuristicOrchestrator),
    Llm(LlmOrchestrator),
}

impl Orchestrator {
    /// Single normalization + selection point for the strategy set.
    ///
    /// `"stub"` and `"llm"` (after trim/lowercase) pick their strategies;
    /// anything else, including the default, runs the heuristic analyzers.
    /// The model client is only constructed when the llm strategy is
    /// actually selected.
    pub fn from_mode(mode: &str, llm_cfg: &llm_service::LlmModelConfig) -> PrResult<Self> {
        Ok(match mode.trim().to_ascii_lowercase().as_str() {
            "stub" => Self::Stub(StubOrchestrator),
            "llm" => Self::Llm(LlmOrchestrator::new(llm_service::LlmService::from_config(
                llm_cfg.clone(),
            )?)),
            _ => Self::Heuristic(HeuristicOrchestrator),
        })
    }

    /// Run the selected strategy over the job's diff snapshot.
    pub async fn run(&self, diff: Option<&str>) -> PrResult<PipelineOutcome> {
        match self {
            Self::Stub(s) => Ok(s.run(diff)),
            Self::Heuristic(s) => Ok(s.run(diff)),
            Self::Llm(s) => s.run(diff).await,
        }
    }
}

/// Canned-output strategy kept for smoke runs and wiring checks.
#[derive(Debug, Default)]
pub struct StubOrchestrator;

const STUB_AGENT: &str = "stub-agent";

impl StubOrchestrator {
    pub fn run(&self, diff: Option<&str>) -> PipelineOutcome {
        let Some(diff) = non_empty(diff) else {
            let run = run_metadata(vec![STUB_AGENT.to_string()], &[], 0);
            return PipelineOutcome {
                summary: "Unable to perform review: no diff was provided.".to_string(),
                findings: Vec::new(),
                run,
            };
        };

        let findings = vec![Finding {
            agent: Some(STUB_AGENT.to_string()),
            file_path: String::new(),
            line_start: 0,
            line_end: 0,
            category: "general".to_string(),
            severity: "info".to_string(),
            title: "Stubbed review".to_string(),
            body: "Placeholder produced without analyzing the diff contents.".to_string(),
            suggested_fix: None,
        }];
        let run = run_metadata(
            vec![STUB_AGENT.to_string()],
            &findings,
            count_diff_files(diff),
        );
        PipelineOutcome {
            summary: "Stubbed review completed with one placeholder comment.".to_string(),
            findings,
            run,
        }
    }
}

/// Multi-analyzer strategy: parse the diff, run every analyzer, aggregate
/// findings in analyzer-list order.
#[derive(Debug, Default)]
pub struct HeuristicOrchestrator;

impl HeuristicOrchestrator {
    pub fn run(&self, diff: Option<&str>) -> PipelineOutcome {
        let agents: Vec<String> = default_analyzers()
            .iter()
            .map(|a| a.name().to_string())
            .collect();

        let Some(diff) = non_empty(diff) else {
            let run = run_metadata(agents, &[], 0);
            return PipelineOutcome {
                summary: "No diff provided; multi-agent review skipped.".to_string(),
                findings: Vec::new(),
                run,
            };
        };

        let files = parse_unified_diff(diff);
        let mut findings = Vec::new();
        for analyzer in default_analyzers() {
            let produced = analyzer.run(&files);
            debug!(
                analyzer = analyzer.name(),
                count = produced.len(),
                "analyzer finished"
            );
            findings.extend(produced);
        }

        let run = run_metadata(agents, &findings, files.len());
        let summary = build_summary(&run);
        PipelineOutcome {
            summary,
            findings,
            run,
        }
    }
}

/// Treat a missing or empty diff the same way: there is nothing to review.
pub(crate) fn non_empty(diff: Option<&str>) -> Option<&str> {
    diff.filter(|d| !d.is_empty())
}

/// Trivial file count for strategies that never parse the diff: the number
/// of file-boundary markers, at least 1 once a diff is present.
pub(crate) fn count_diff_files(diff: &str) -> usize {
    diff.matches("diff --git").count().max(1)
}

/// Assemble run metadata from the finding list.
pub(crate) fn run_metadata(
    agents_run: Vec<String>,
    findings: &[Finding],
    files_reviewed: usize,
) -> PipelineRun {
    let mut severity_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for finding in findings {
        *severity_breakdown.entry(finding.severity.clone()).or_insert(0) += 1;
    }

    let mut categories: Vec<String> = findings.iter().map(|f| f.category.clone()).collect();
    categories.sort();
    categories.dedup();

    PipelineRun {
        agents_run,
        total_findings: findings.len(),
        files_reviewed,
        severity_breakdown,
        categories_detected: categories,
        tokens_prompt: None,
        tokens_completion: None,
        latency_ms: None,
    }
}

/// Summary sentence: always states file/finding counts, conditionally
/// appends severity-breakdown and focus-area clauses.
fn build_summary(run: &PipelineRun) -> String {
    let mut parts = vec![format!(
        "Multi-agent review touched {} file(s) and produced {} actionable insight(s).",
        run.files_reviewed, run.total_findings
    )];
    if !run.severity_breakdown.is_empty() {
        let bucket = run
            .severity_breakdown
            .iter()
            .map(|(level, count)| format!("{level}:{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Severity mix -> {bucket}."));
    }
    if !run.categories_detected.is_empty() {
        parts.push(format!(
            "Focus areas: {}.",
            run.categories_detected.join(", ")
        ));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF_WITH_EVAL: &str = "\
diff --git a/app/run.py b/app/run.py
+++ b/app/run.py
@@ -1 +1,2 @@
 import os
+eval(x)
";

    #[test]
    fn heuristic_skips_on_absent_diff() {
        let outcome = HeuristicOrchestrator.run(None);
        assert!(outcome.summary.contains("skipped"));
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.run.files_reviewed, 0);
        assert_eq!(outcome.run.agents_run.len(), 4);
    }

    #[test]
    fn heuristic_empty_diff_behaves_like_absent() {
        let outcome = HeuristicOrchestrator.run(Some(""));
        assert!(outcome.summary.contains("skipped"));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn heuristic_aggregates_security_findings() {
        let outcome = HeuristicOrchestrator.run(Some(DIFF_WITH_EVAL));
        let security: Vec<_> = outcome
            .findings
            .iter()
            .filter(|f| f.category == "security")
            .collect();
        assert_eq!(security.len(), 1);
        assert_eq!(security[0].severity, "warning");
        assert_eq!(outcome.run.files_reviewed, 1);
        assert_eq!(outcome.run.total_findings, outcome.findings.len());
        assert!(outcome.summary.contains("Severity mix"));
        assert!(outcome.summary.contains("Focus areas"));
    }

    #[test]
    fn stub_returns_single_canned_finding() {
        let outcome = StubOrchestrator.run(Some(DIFF_WITH_EVAL));
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.run.agents_run, vec!["stub-agent".to_string()]);
        assert_eq!(outcome.run.total_findings, 1);
        assert_eq!(outcome.run.files_reviewed, 1);

        let empty = StubOrchestrator.run(None);
        assert!(empty.summary.contains("Unable to perform review"));
        assert!(empty.findings.is_empty());
        assert_eq!(empty.run.total_findings, 0);
    }

    #[test]
    fn mode_selection_normalizes_input() {
        let cfg = llm_service::LlmModelConfig {
            provider: llm_service::LlmProvider::Mock,
            model: "test".into(),
            endpoint: "http://localhost".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
        };

        assert!(matches!(
            Orchestrator::from_mode("  STUB ", &cfg).unwrap(),
            Orchestrator::Stub(_)
        ));
        assert!(matches!(
            Orchestrator::from_mode("llm", &cfg).unwrap(),
            Orchestrator::Llm(_)
        ));
        assert!(matches!(
            Orchestrator::from_mode("heuristic", &cfg).unwrap(),
            Orchestrator::Heuristic(_)
        ));
        assert!(matches!(
            Orchestrator::from_mode("anything-else", &cfg).unwrap(),
            Orchestrator::Heuristic(_)
        ));
    }
}
