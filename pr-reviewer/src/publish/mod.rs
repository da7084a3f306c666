//! Comment placement and rendering.
//!
//! Splits a finding list into an inline-anchored subset (bounded by a
//! configured maximum and validated against the diff line index) and a
//! remainder, and renders both the structured inline payloads and the
//! human-readable summary body posted on the PR thread.

pub mod index;
pub mod sync;

use serde::Serialize;

use crate::model::{Finding, PipelineRun};
use index::{DiffIndex, build_diff_index};

/// Post-change side marker used by the review API.
const SIDE_RIGHT: &str = "RIGHT";

/// One inline comment as accepted by the pull-request review API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineComment {
    pub path: String,
    pub line: u32,
    pub side: &'static str,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_side: Option<&'static str>,
}

/// Partition findings into inline payloads and a remainder list.
///
/// A finding goes inline iff the cap is not yet reached, it names a file,
/// it has a positive anchor line, and that (file, line) pair is visible in
/// the diff's post-change view. Everything else passes through unchanged,
/// preserving original order. `inline.len() + remainder.len()` always
/// equals `findings.len()`.
pub fn build_inline_review_comments(
    findings: &[Finding],
    diff: Option<&str>,
    max_inline: usize,
) -> (Vec<InlineComment>, Vec<Finding>) {
    let diff_index = build_diff_index(diff);
    let mut inline = Vec::new();
    let mut remainder = Vec::new();

    for finding in findings {
        match inline_anchor(finding, &diff_index) {
            Some(line) if inline.len() < max_inline => {
                inline.push(to_inline_comment(finding, line));
            }
            _ => remainder.push(finding.clone()),
        }
    }

    (inline, remainder)
}

/// Resolve the anchor line for a finding, or `None` when it cannot be
/// attached to the diff.
fn inline_anchor(finding: &Finding, diff_index: &DiffIndex) -> Option<u32> {
    if finding.file_path.is_empty() {
        return None;
    }
    let line = finding.anchor_line()?;
    diff_index
        .get(&finding.file_path)
        .filter(|lines| lines.contains(&line))
        .map(|_| line)
}

fn to_inline_comment(finding: &Finding, line: u32) -> InlineComment {
    let multi_line = finding.line_start > 0 && finding.line_end > finding.line_start;
    InlineComment {
        path: finding.file_path.clone(),
        line,
        side: SIDE_RIGHT,
        body: format_inline_body(finding),
        start_line: multi_line.then_some(finding.line_start),
        start_side: multi_line.then_some(SIDE_RIGHT),
    }
}

fn format_inline_body(finding: &Finding) -> String {
    let severity = fallback(&finding.severity, "info").to_uppercase();
    let category = title_case(fallback(&finding.category, "general"));
    let title = if finding.title.is_empty() {
        format!("{category} issue")
    } else {
        finding.title.clone()
    };
    let body = if finding.body.is_empty() {
        "No description provided."
    } else {
        finding.body.as_str()
    };

    let mut sections = vec![format!("**{title}** ({severity} · {category})"), body.to_string()];
    if let Some(fix) = &finding.suggested_fix {
        sections.push(format!("Suggested fix: {fix}"));
    }
    if let Some(agent) = &finding.agent {
        sections.push(format!("Agent: {agent}"));
    }
    sections.join("\n\n")
}

/// Render the summary comment body posted on the PR thread.
///
/// Deterministic layout: header, summary text (placeholder when empty),
/// optional inline-posted note, metrics block, a capped "Key Findings"
/// list with an overflow line, and a closing attribution line.
pub fn build_summary_body(
    summary: Option<&str>,
    findings: &[Finding],
    max_list_items: usize,
    metadata: Option<&PipelineRun>,
    inline_posted: usize,
    total_findings: usize,
) -> String {
    let safe_summary = match summary.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => "No summary provided.",
    };

    let mut lines: Vec<String> = vec![
        "## 🤖 Automated Review Summary".to_string(),
        String::new(),
        safe_summary.to_string(),
        String::new(),
    ];

    if inline_posted > 0 {
        lines.push(format!(
            "_Posted {inline_posted} inline comment(s); remaining findings summarized below._"
        ));
        lines.push(String::new());
    }

    lines.extend(format_metrics(metadata, total_findings));
    if lines.len() > 4 {
        lines.push(String::new());
    }

    lines.push("### Key Findings".to_string());
    if findings.is_empty() {
        lines.push("No additional issues are listed in this summary.".to_string());
    } else {
        let selected = &findings[..findings.len().min(max_list_items)];
        for (idx, finding) in selected.iter().enumerate() {
            lines.push(format_finding_section(idx + 1, finding));
            lines.push(String::new());
        }
        let remaining = findings.len() - selected.len();
        if remaining > 0 {
            lines.push(format!("...and {remaining} more comment(s) not shown here."));
            lines.push(String::new());
        }
    }

    lines.push("---".to_string());
    lines.push("_Generated automatically by the PR review backend._".to_string());
    lines.join("\n").trim().to_string()
}

fn format_metrics(metadata: Option<&PipelineRun>, total_findings: usize) -> Vec<String> {
    let Some(meta) = metadata else {
        return Vec::new();
    };

    let mut metrics = Vec::new();
    let total = if meta.total_findings > 0 {
        meta.total_findings
    } else {
        total_findings
    };

    let mut summary_parts = vec![format!("{total} comment(s)")];
    if meta.files_reviewed > 0 {
        summary_parts.push(format!("{} file(s) reviewed", meta.files_reviewed));
    }
    metrics.push(format!("**Metrics:** {}", summary_parts.join(" · ")));

    if !meta.severity_breakdown.is_empty() {
        let items = meta
            .severity_breakdown
            .iter()
            .map(|(level, count)| format!("{level}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        metrics.push(format!("**Severity Breakdown:** {items}"));
    }

    if !meta.categories_detected.is_empty() {
        metrics.push(format!(
            "**Categories:** {}",
            meta.categories_detected.join(", ")
        ));
    }

    metrics
}

fn format_finding_section(index: usize, finding: &Finding) -> String {
    let location = format_line_range(finding);
    let location_display = if location.is_empty() {
        format!(" `{}`", finding.file_path)
    } else {
        format!(" `{}` {location}", finding.file_path)
    };
    let severity = fallback(&finding.severity, "info").to_uppercase();
    let category = title_case(fallback(&finding.category, "general"));
    let title = if finding.title.is_empty() {
        format!("{category} issue")
    } else {
        finding.title.clone()
    };

    let mut lines = vec![
        format!("{index}. **{title}** —{location_display} ({severity} · {category})"),
        format!("   - {}", finding.body),
    ];
    if let Some(fix) = &finding.suggested_fix {
        lines.push(format!("   - Suggested fix: {fix}"));
    }
    if let Some(agent) = &finding.agent {
        lines.push(format!("   - Agent: {agent}"));
    }
    lines.join("\n")
}

fn format_line_range(finding: &Finding) -> String {
    let start = finding.line_start;
    let end = finding.line_end;
    if start == 0 && end == 0 {
        return String::new();
    }
    if end != 0 && end != start {
        return if start != 0 {
            format!("L{start}-{end}")
        } else {
            format!("L{end}")
        };
    }
    if start != 0 {
        format!("L{start}")
    } else {
        String::new()
    }
}

fn fallback<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

/// Capitalize the first letter of each word, the way category tags are
/// displayed ("project-management" → "Project-Management").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: &str = "\
diff --git a/src/app.py b/src/app.py
+++ b/src/app.py
@@ -1,2 +1,4 @@
 import os
+import sys
+import csv
 import json
";

    fn anchored_finding(line: u32) -> Finding {
        Finding {
            agent: Some("security-agent".into()),
            file_path: "src/app.py".into(),
            line_start: line,
            line_end: line,
            category: "security".into(),
            severity: "warning".into(),
            title: "Potential insecure call".into(),
            body: "Check this import.".into(),
            suggested_fix: Some("Remove it.".into()),
        }
    }

    #[test]
    fn cap_and_conservation_hold() {
        let findings = vec![anchored_finding(2), anchored_finding(3), anchored_finding(1)];
        let (inline, remainder) = build_inline_review_comments(&findings, Some(DIFF), 1);
        assert_eq!(inline.len(), 1);
        assert_eq!(remainder.len(), 2);
        assert_eq!(inline.len() + remainder.len(), findings.len());
        // First eligible finding wins the only slot; the rest keep order.
        assert_eq!(inline[0].line, 2);
        assert_eq!(remainder[0].line_start, 3);
        assert_eq!(remainder[1].line_start, 1);
    }

    #[test]
    fn inline_placement_requires_indexed_anchor() {
        let outside = Finding {
            line_start: 99,
            line_end: 99,
            ..anchored_finding(0)
        };
        let pathless = Finding {
            file_path: String::new(),
            ..anchored_finding(2)
        };
        let unanchored = Finding {
            line_start: 0,
            line_end: 0,
            ..anchored_finding(0)
        };
        let findings = vec![outside, pathless, unanchored, anchored_finding(3)];
        let (inline, remainder) = build_inline_review_comments(&findings, Some(DIFF), 10);
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].line, 3);
        assert_eq!(remainder.len(), 3);
    }

    #[test]
    fn anchor_prefers_end_line_and_marks_right_side() {
        let findings = vec![anchored_finding(3)];
        let (inline, _) = build_inline_review_comments(&findings, Some(DIFF), 5);
        assert_eq!(inline[0].side, "RIGHT");
        assert_eq!(inline[0].start_line, None);
        assert_eq!(inline[0].start_side, None);
    }

    #[test]
    fn multi_line_findings_carry_start_pair() {
        let spanning = Finding {
            line_start: 2,
            line_end: 3,
            ..anchored_finding(0)
        };
        let (inline, _) = build_inline_review_comments(&[spanning], Some(DIFF), 5);
        assert_eq!(inline[0].line, 3);
        assert_eq!(inline[0].start_line, Some(2));
        assert_eq!(inline[0].start_side, Some("RIGHT"));
    }

    #[test]
    fn no_diff_routes_everything_to_remainder() {
        let findings = vec![anchored_finding(2), anchored_finding(3)];
        let (inline, remainder) = build_inline_review_comments(&findings, None, 10);
        assert!(inline.is_empty());
        assert_eq!(remainder.len(), 2);
    }

    #[test]
    fn inline_body_renders_all_sections() {
        let body = format_inline_body(&anchored_finding(2));
        assert!(body.contains("**Potential insecure call** (WARNING · Security)"));
        assert!(body.contains("Check this import."));
        assert!(body.contains("Suggested fix: Remove it."));
        assert!(body.contains("Agent: security-agent"));
    }

    #[test]
    fn summary_body_lists_and_truncates_findings() {
        let findings = vec![anchored_finding(1), anchored_finding(2), anchored_finding(3)];
        let run = crate::pipeline::run_metadata(vec!["security-agent".into()], &findings, 1);
        let body = build_summary_body(Some("All good."), &findings, 2, Some(&run), 1, 3);

        assert!(body.starts_with("## 🤖 Automated Review Summary"));
        assert!(body.contains("All good."));
        assert!(body.contains("_Posted 1 inline comment(s);"));
        assert!(body.contains("**Metrics:** 3 comment(s) · 1 file(s) reviewed"));
        assert!(body.contains("**Severity Breakdown:** warning: 3"));
        assert!(body.contains("**Categories:** security"));
        assert!(body.contains("1. **Potential insecure call** — `src/app.py` L1"));
        assert!(body.contains("...and 1 more comment(s) not shown here."));
        assert!(body.ends_with("_Generated automatically by the PR review backend._"));
    }

    #[test]
    fn summary_body_handles_empty_inputs() {
        let body = build_summary_body(None, &[], 5, None, 0, 0);
        assert!(body.contains("No summary provided."));
        assert!(body.contains("No additional issues are listed in this summary."));
        assert!(!body.contains("Metrics"));
    }

    #[test]
    fn line_ranges_render_compactly() {
        let single = anchored_finding(4);
        assert_eq!(format_line_range(&single), "L4");

        let span = Finding {
            line_start: 2,
            line_end: 6,
            ..anchored_finding(0)
        };
        assert_eq!(format_line_range(&span), "L2-6");

        let end_only = Finding {
            line_start: 0,
            line_end: 6,
            ..anchored_finding(0)
        };
        assert_eq!(format_line_range(&end_only), "L6");

        let none = Finding {
            line_start: 0,
            line_end: 0,
            ..anchored_finding(0)
        };
        assert_eq!(format_line_range(&none), "");
    }

    #[test]
    fn title_case_handles_hyphenated_tags() {
        assert_eq!(title_case("project-management"), "Project-Management");
        assert_eq!(title_case("security"), "Security");
    }
}
