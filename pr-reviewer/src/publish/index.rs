//! Post-change line index used to decide inline anchoring.
//!
//! Walks the diff with the same state-machine shape as the parser, but
//! records every new-file line number that survives the change: additions
//! and in-hunk context lines. Deletions have no post-change anchor and are
//! excluded. Lines with an unrecognized prefix are treated as context and
//! advance the counter; tightening this would reject real-world diffs with
//! unusual markers.

use std::collections::{BTreeSet, HashMap};

use crate::parser::HUNK_HEADER;

/// file path → set of new-file line numbers visible in the diff.
pub type DiffIndex = HashMap<String, BTreeSet<u32>>;

/// Build the inline-anchor index from a diff snapshot. Absent or empty
/// diff text yields an empty index (nothing can anchor inline).
pub fn build_diff_index(diff: Option<&str>) -> DiffIndex {
    let mut index = DiffIndex::new();
    let Some(diff) = diff.filter(|d| !d.is_empty()) else {
        return index;
    };

    let mut current_file: Option<String> = None;
    let mut next_line: Option<u32> = None;

    for line in diff.lines() {
        if line.starts_with("diff --git") {
            current_file = None;
            next_line = None;
            continue;
        }
        if let Some(path) = line.strip_prefix("+++ b/") {
            current_file = Some(path.trim().to_string());
            continue;
        }
        if line.starts_with("@@") {
            // A malformed header disables tracking until the next valid one.
            next_line = HUNK_HEADER
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok());
            continue;
        }

        let (Some(file), Some(line_no)) = (current_file.as_ref(), next_line) else {
            continue;
        };
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        if line.starts_with('+') {
            index.entry(file.clone()).or_default().insert(line_no);
            next_line = Some(line_no + 1);
            continue;
        }
        if line.starts_with('-') {
            continue;
        }
        if line.starts_with('\\') {
            continue;
        }
        index.entry(file.clone()).or_default().insert(line_no);
        next_line = Some(line_no + 1);
    }

    index
}
