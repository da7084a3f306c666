//! Unified-diff parser feeding the analyzer pipeline.
//!
//! Produces a per-file view of added/removed lines with new-file line
//! numbers attached. The parser is deliberately lenient: a malformed hunk
//! header only disables line attribution until the next valid header, and
//! unusual marker lines (e.g. "no newline at end of file") fall through as
//! context instead of aborting the parse.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `@@ -old[,n] +new[,n] @@` — capture 1 is the new-file start line.
    pub(crate) static ref HUNK_HEADER: Regex =
        Regex::new(r"^@@ -\d+(?:,\d+)? \+(\d+)(?:,\d+)? @@").unwrap();
}

/// Placeholder path for a file record whose `+++` header never appeared.
const UNKNOWN_PATH: &str = "unknown";

/// Per-file view of one unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub path: String,
    /// (new-file line number, text) pairs, in diff order.
    pub additions: Vec<(u32, String)>,
    /// (line number at the deletion point, text) pairs, in diff order.
    pub deletions: Vec<(u32, String)>,
}

impl ParsedFile {
    fn start() -> Self {
        Self {
            path: UNKNOWN_PATH.to_string(),
            additions: Vec::new(),
            deletions: Vec::new(),
        }
    }
}

/// Parse unified diff text into per-file additions/deletions.
///
/// Output order matches file appearance order in the diff; within a file,
/// addition/deletion order matches diff order. File records that never got a
/// path and never collected content are dropped as parser noise.
pub fn parse_unified_diff(diff: &str) -> Vec<ParsedFile> {
    let mut files: Vec<ParsedFile> = Vec::new();
    let mut current: Option<ParsedFile> = None;
    // Running new-file line counter; 0 means "unknown" (no valid hunk header
    // seen yet), which disables attribution until the next valid header.
    let mut current_line: u32 = 0;

    for line in diff.lines() {
        if line.starts_with("diff --git") {
            if let Some(file) = current.take() {
                files.push(file);
            }
            current = Some(ParsedFile::start());
            current_line = 0;
            continue;
        }

        if line.starts_with("+++") {
            if let Some(file) = current.as_mut() {
                let path = line
                    .strip_prefix("+++ b/")
                    .or_else(|| line.strip_prefix("+++ "))
                    .unwrap_or(line);
                file.path = path.to_string();
            }
            continue;
        }

        if line.starts_with("@@") {
            current_line = HUNK_HEADER
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            continue;
        }

        if line.starts_with('+') {
            if let Some(file) = current.as_mut() {
                let line_no = if current_line == 0 { 1 } else { current_line };
                file.additions.push((line_no, line[1..].to_string()));
                current_line += 1;
            }
            continue;
        }

        if line.starts_with('-') && !line.starts_with("---") {
            if let Some(file) = current.as_mut() {
                let line_no = if current_line == 0 { 1 } else { current_line };
                // Deleted lines do not occupy new-file line numbers, so the
                // counter stays put.
                file.deletions.push((line_no, line[1..].to_string()));
            }
            continue;
        }

        if current_line > 0 {
            current_line += 1;
        }
    }

    if let Some(file) = current.take() {
        files.push(file);
    }

    files.retain(|file| {
        file.path != UNKNOWN_PATH || !file.additions.is_empty() || !file.deletions.is_empty()
    });
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_DIFF: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,4 +1,5 @@
 fn existing() {}
+fn added_one() {}
 fn context() {}
-fn removed() {}
+fn added_two() {}
";

    #[test]
    fn attributes_new_file_line_numbers() {
        let files = parse_unified_diff(SIMPLE_DIFF);
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.path, "src/lib.rs");
        assert_eq!(
            file.additions,
            vec![
                (2, "fn added_one() {}".to_string()),
                (4, "fn added_two() {}".to_string()),
            ]
        );
        assert_eq!(file.deletions, vec![(4, "fn removed() {}".to_string())]);
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_unified_diff(SIMPLE_DIFF), parse_unified_diff(SIMPLE_DIFF));
    }

    #[test]
    fn addition_lines_are_monotonic_and_respect_hunk_start() {
        let diff = "\
diff --git a/a.py b/a.py
+++ b/a.py
@@ -10,2 +12,4 @@
 context
+first
 more context
+second
@@ -40,1 +44,2 @@
+third
";
        let files = parse_unified_diff(diff);
        let additions = &files[0].additions;
        assert_eq!(additions[0].0, 13);
        assert_eq!(additions[1].0, 15);
        assert_eq!(additions[2].0, 44);
        let mut previous = 0;
        for (line_no, _) in additions {
            assert!(*line_no >= previous);
            previous = *line_no;
        }
    }

    #[test]
    fn malformed_hunk_header_falls_back_to_line_one() {
        let diff = "\
diff --git a/b.py b/b.py
+++ b/b.py
@@ garbage @@
+orphan addition
+another
";
        let files = parse_unified_diff(diff);
        // Unknown counter: first addition lands on line 1 and restarts the
        // counter from there.
        assert_eq!(files[0].additions[0].0, 1);
        assert_eq!(files[0].additions[1].0, 1);
    }

    #[test]
    fn strips_plus_prefix_variants_from_header() {
        let diff = "\
diff --git a/x b/x
+++ b/deep/nested/file.py
@@ -1 +1 @@
+x = 1
diff --git a/y b/y
+++ new_file.py
@@ -1 +1 @@
+y = 2
";
        let files = parse_unified_diff(diff);
        assert_eq!(files[0].path, "deep/nested/file.py");
        assert_eq!(files[1].path, "new_file.py");
    }

    #[test]
    fn drops_headerless_noise_records() {
        let diff = "\
diff --git a/only-header b/only-header
diff --git a/real b/real
+++ b/real.py
@@ -1 +1,2 @@
 ctx
+added
";
        let files = parse_unified_diff(diff);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "real.py");
    }

    #[test]
    fn empty_input_parses_to_nothing() {
        assert!(parse_unified_diff("").is_empty());
    }
}
