//! Line based unified diff between two dumps.

use difference::{Changeset, Difference};
use std::fmt::Write as _;
use std::ops::Range;

/// Label of the left-hand side.
pub const EXPECTED_LABEL: &str = "Expected";
/// Label of the right-hand side.
pub const ACTUAL_LABEL: &str = "Actual";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Same,
    Removed,
    Added,
}

impl Tag {
    const fn prefix(self) -> char {
        match self {
            Self::Same => ' ',
            Self::Removed => '-',
            Self::Added => '+',
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    tag: Tag,
    text: &'a str,
}

/// Unified diff turning `expected` into `actual` with `context` unchanged
/// lines around every change. Empty when both texts are equal.
#[must_use]
pub fn unified(expected: &str, actual: &str, context: usize) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let lines = split_lines(&changeset.diffs);
    let hunks = group(&lines, context);
    if hunks.is_empty() {
        return String::new();
    }

    let mut positions = Vec::with_capacity(lines.len());
    let (mut old, mut new) = (0usize, 0usize);
    for line in &lines {
        positions.push((old, new));
        match line.tag {
            Tag::Same => {
                old += 1;
                new += 1;
            }
            Tag::Removed => old += 1,
            Tag::Added => new += 1,
        }
    }

    let mut out = format!("--- {EXPECTED_LABEL}\n+++ {ACTUAL_LABEL}\n");
    for hunk in hunks {
        let body = &lines[hunk.clone()];
        let (old_start, new_start) = positions[hunk.start];
        let old_len = body.iter().filter(|l| l.tag != Tag::Added).count();
        let new_len = body.iter().filter(|l| l.tag != Tag::Removed).count();
        let _ = writeln!(
            out,
            "@@ -{} +{} @@",
            range(old_start, old_len),
            range(new_start, new_len)
        );
        for line in body {
            out.push(line.tag.prefix());
            out.push_str(line.text);
            out.push('\n');
        }
    }
    out
}

fn split_lines(diffs: &[Difference]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for diff in diffs {
        let (tag, chunk) = match diff {
            Difference::Same(x) => (Tag::Same, x),
            Difference::Rem(x) => (Tag::Removed, x),
            Difference::Add(x) => (Tag::Added, x),
        };
        lines.extend(chunk.split('\n').map(|text| Line { tag, text }));
    }
    lines
}

/// Ranges of `lines` to print. Changes closer than `2 * context` share a hunk.
fn group(lines: &[Line<'_>], context: usize) -> Vec<Range<usize>> {
    let mut hunks: Vec<Range<usize>> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if line.tag == Tag::Same {
            continue;
        }
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(lines.len());
        match hunks.last_mut() {
            Some(last) if start <= last.end => last.end = last.end.max(end),
            _ => hunks.push(start..end),
        }
    }
    hunks
}

/// `start` is zero based. A single line omits the length, an empty range
/// points at the line before it.
fn range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{len}", start + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod hunks {
        use super::*;

        #[test]
        fn test_equal_texts_have_no_diff() {
            assert_eq!(unified("a\nb", "a\nb", 1), "");
        }

        #[test]
        fn test_changed_middle_line() {
            let diff = unified("one\nTWO\nend", "one\ntwo\nend", 1);
            assert!(diff.starts_with("--- Expected\n+++ Actual\n@@ -1,3 +1,3 @@\n"));
            assert!(diff.contains(" one\n"));
            assert!(diff.contains("-TWO\n"));
            assert!(diff.contains("+two\n"));
            assert!(diff.ends_with(" end\n"));
        }

        #[test]
        fn test_distant_changes_split_into_hunks() {
            let diff = unified("a\nb\nc\nd\ne\nf\ng", "a\nB\nc\nd\ne\nF\ng", 1);
            assert!(diff.contains("@@ -1,3 +1,3 @@\n"));
            assert!(diff.contains("@@ -5,3 +5,3 @@\n"));
            assert!(!diff.contains(" d\n"));
        }

        #[test]
        fn test_wider_context_merges_hunks() {
            let diff = unified("a\nb\nc\nd\ne\nf\ng", "a\nB\nc\nd\ne\nF\ng", 2);
            assert_eq!(diff.matches("@@ -").count(), 1);
            assert!(diff.contains(" d\n"));
        }

        #[test]
        fn test_zero_context() {
            let diff = unified("a\nb\nc", "a\nx\nc", 0);
            assert!(diff.contains("@@ -2 +2 @@\n"));
            assert!(!diff.contains(" a\n"));
        }
    }

    mod ranges {
        use super::*;

        #[test]
        fn test_range_format() {
            assert_eq!(range(0, 3), "1,3");
            assert_eq!(range(4, 1), "5");
            assert_eq!(range(2, 0), "2,0");
        }
    }
}
