//! Display utilities for Quarry.
//!
//! Renders query trees as indented text for `explain` output and rule traces.

mod tree;

pub use tree::{DisplayTree, TreeNode};

/// Truncate a string to `max_len` characters, marking the cut with `...`.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Indent every line of a multi-line string.
pub fn indent(s: &str, prefix: &str) -> String {
    s.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("p.name", 10), "p.name");
        assert_eq!(truncate_string("p.name == \"Bob\"", 8), "p.nam...");
        assert_eq!(truncate_string("ab", 2), "ab");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("Map\nEntity", "  "), "  Map\n  Entity");
    }
}
