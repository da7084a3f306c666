//! Heuristic analyzers run over the parsed diff.
//!
//! Every analyzer consumes the same `&[ParsedFile]` view and produces its
//! findings independently: no shared state, no ordering dependency between
//! analyzers. Presentation order is fixed by [`default_analyzers`].

use crate::model::Finding;
use crate::parser::ParsedFile;

/// Added lines longer than this trip the complexity check.
const MAX_LINE_LEN: usize = 120;

/// Substrings that flag a potentially dangerous call in added code.
const DANGEROUS_TOKENS: &[&str] = &[
    "eval(",
    "exec(",
    "os.system(",
    "subprocess.Popen",
    "SECRET_KEY",
    "password=",
];

/// Suffixes the coverage check treats as reviewable source code.
const SOURCE_SUFFIXES: &[&str] = &[
    ".rs", ".py", ".ts", ".js", ".dart", ".go", ".java", ".kt",
];

/// One independent heuristic check (enum-dispatch, no trait objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
    Complexity,
    DebugArtifact,
    Security,
    TestingCoverage,
}

impl Analyzer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Complexity => "complexity-agent",
            Self::DebugArtifact => "debug-artifact-agent",
            Self::Security => "security-agent",
            Self::TestingCoverage => "testing-agent",
        }
    }

    /// Produce findings for the parsed diff. Within one analyzer, findings
    /// come out in file order, then line order.
    pub fn run(&self, files: &[ParsedFile]) -> Vec<Finding> {
        match self {
            Self::Complexity => run_complexity(self.name(), files),
            Self::DebugArtifact => run_debug_artifact(self.name(), files),
            Self::Security => run_security(self.name(), files),
            Self::TestingCoverage => run_testing_coverage(self.name(), files),
        }
    }
}

/// The fixed analyzer set, in presentation order.
pub fn default_analyzers() -> &'static [Analyzer] {
    &[
        Analyzer::Complexity,
        Analyzer::DebugArtifact,
        Analyzer::Security,
        Analyzer::TestingCoverage,
    ]
}

fn finding(
    agent: &str,
    path: &str,
    line_start: u32,
    line_end: u32,
    category: &str,
    severity: &str,
    title: &str,
    body: &str,
    suggested_fix: &str,
) -> Finding {
    Finding {
        agent: Some(agent.to_string()),
        file_path: path.to_string(),
        line_start,
        line_end,
        category: category.to_string(),
        severity: severity.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        suggested_fix: Some(suggested_fix.to_string()),
    }
}

fn run_complexity(agent: &str, files: &[ParsedFile]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for file in files {
        for (line_no, text) in &file.additions {
            if text.chars().count() > MAX_LINE_LEN {
                findings.push(finding(
                    agent,
                    &file.path,
                    *line_no,
                    *line_no,
                    "maintainability",
                    "warning",
                    "Long line may hurt readability",
                    "Consider breaking this statement into smaller chunks or helper functions.",
                    "Wrap the logic across multiple lines or extract helpers.",
                ));
            }
        }
    }
    findings
}

fn run_debug_artifact(agent: &str, files: &[ParsedFile]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for file in files {
        let path_is_test = file.path.to_lowercase().contains("test");
        for (line_no, text) in &file.additions {
            let lowered = text.to_lowercase();
            if lowered.contains("todo") || lowered.contains("fixme") {
                findings.push(finding(
                    agent,
                    &file.path,
                    *line_no,
                    *line_no,
                    "project-management",
                    "info",
                    "Leftover TODO/FIXME",
                    "Track open work in an issue instead of shipping it as an inline marker.",
                    "Open an issue and remove the inline TODO before merge.",
                ));
            }
            if text.contains("print(") && !path_is_test {
                findings.push(finding(
                    agent,
                    &file.path,
                    *line_no,
                    *line_no,
                    "observability",
                    "info",
                    "Debug print detected",
                    "Prefer structured logging over bare print statements in production modules.",
                    "Route the message through the shared logger instead of print().",
                ));
            }
        }
    }
    findings
}

fn run_security(agent: &str, files: &[ParsedFile]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for file in files {
        for (line_no, text) in &file.additions {
            if DANGEROUS_TOKENS.iter().any(|token| text.contains(token)) {
                findings.push(finding(
                    agent,
                    &file.path,
                    *line_no,
                    *line_no,
                    "security",
                    "warning",
                    "Potential insecure call",
                    "The diff introduces a pattern that often leads to security issues. Validate inputs or use safer helpers.",
                    "Replace the insecure call with a vetted helper or sanitize inputs first.",
                ));
            }
        }
    }
    findings
}

fn run_testing_coverage(agent: &str, files: &[ParsedFile]) -> Vec<Finding> {
    if files.is_empty() {
        return Vec::new();
    }

    let tests_touched = files
        .iter()
        .any(|file| file.path.to_lowercase().contains("test"));
    if tests_touched {
        return Vec::new();
    }

    let Some(target) = files.iter().find(|file| {
        SOURCE_SUFFIXES
            .iter()
            .any(|suffix| file.path.ends_with(suffix))
            && !file.path.to_lowercase().contains("test")
    }) else {
        return Vec::new();
    };

    vec![finding(
        agent,
        &target.path,
        1,
        5,
        "testing",
        "info",
        "No accompanying tests",
        "Application code changed but no tests were updated. Consider adding coverage for regressions.",
        "Add or update tests to cover the new behavior.",
    )]
}
