//! Serde-facing data model for findings and run metadata.
//!
//! These shapes round-trip through the persisted result blob and through the
//! remote-model payload, so field names are part of the contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One structured review observation produced by an analyzer or the model.
///
/// Line numbers are in new-file numbering; zero means "no anchor", which
/// keeps the finding out of inline placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the analyzer/agent that produced the finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub file_path: String,
    #[serde(default)]
    pub line_start: u32,
    #[serde(default)]
    pub line_end: u32,
    /// Free-form short tag, e.g. "security".
    pub category: String,
    /// Free-form short tag, e.g. "warning".
    pub severity: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

impl Finding {
    /// Line usable for inline anchoring: the end line wins over the start
    /// line, and either must be positive.
    pub fn anchor_line(&self) -> Option<u32> {
        [self.line_end, self.line_start]
            .into_iter()
            .find(|&line| line > 0)
    }
}

/// Aggregated metadata for one pipeline run, persisted with the findings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Analyzer names that ran, in presentation order.
    pub agents_run: Vec<String>,
    pub total_findings: usize,
    pub files_reviewed: usize,
    /// severity tag → count of findings carrying it.
    pub severity_breakdown: BTreeMap<String, usize>,
    /// Sorted distinct category tags.
    pub categories_detected: Vec<String>,
    /// Populated only by the remote-model strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_prompt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_completion: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

/// The serialized result blob stored per job: findings + metadata together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub comments: Vec<Finding>,
    pub metadata: PipelineRun,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_finding() -> Finding {
        Finding {
            agent: Some("security-agent".into()),
            file_path: "src/auth.rs".into(),
            line_start: 3,
            line_end: 5,
            category: "security".into(),
            severity: "warning".into(),
            title: "Potential insecure call".into(),
            body: "Validate inputs before passing them on.".into(),
            suggested_fix: None,
        }
    }

    #[test]
    fn anchor_prefers_end_line() {
        let finding = sample_finding();
        assert_eq!(finding.anchor_line(), Some(5));

        let start_only = Finding {
            line_end: 0,
            ..sample_finding()
        };
        assert_eq!(start_only.anchor_line(), Some(3));

        let unanchored = Finding {
            line_start: 0,
            line_end: 0,
            ..sample_finding()
        };
        assert_eq!(unanchored.anchor_line(), None);
    }

    #[test]
    fn payload_round_trips() {
        let mut severity_breakdown = BTreeMap::new();
        severity_breakdown.insert("warning".to_string(), 1);
        let payload = ReviewPayload {
            comments: vec![sample_finding()],
            metadata: PipelineRun {
                agents_run: vec!["security-agent".into()],
                total_findings: 1,
                files_reviewed: 1,
                severity_breakdown,
                categories_detected: vec!["security".into()],
                tokens_prompt: Some(100),
                tokens_completion: Some(50),
                latency_ms: Some(5.0),
            },
        };

        let serialized = serde_json::to_string(&payload).unwrap();
        let back: ReviewPayload = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back.comments, payload.comments);
        assert_eq!(back.metadata, payload.metadata);
    }

    #[test]
    fn optional_counters_are_omitted_when_absent() {
        let run = PipelineRun::default();
        let serialized = serde_json::to_string(&run).unwrap();
        assert!(!serialized.contains("tokens_prompt"));
        assert!(!serialized.contains("latency_ms"));
    }
}
