//! Tree display for query trees.

use std::fmt;

use crate::truncate_string;

/// Longest detail string printed next to a node before it is cut.
const MAX_DETAIL_WIDTH: usize = 96;

/// A node that can be rendered by [`DisplayTree`].
pub trait TreeNode {
    /// Short label of this node (e.g. `Map`).
    fn name(&self) -> &str;

    /// Child nodes, in rendering order.
    fn children(&self) -> Vec<&dyn TreeNode>;

    /// Additional details shown next to the label.
    fn details(&self) -> Option<String> {
        None
    }
}

/// Renders a [`TreeNode`] and its descendants with box-drawing connectors.
pub struct DisplayTree<'a> {
    root: &'a dyn TreeNode,
    max_detail_width: usize,
}

impl<'a> DisplayTree<'a> {
    /// Create a new display tree.
    pub fn new(root: &'a dyn TreeNode) -> Self {
        Self {
            root,
            max_detail_width: MAX_DETAIL_WIDTH,
        }
    }

    /// Override the detail width limit.
    #[must_use]
    pub fn with_max_detail_width(mut self, width: usize) -> Self {
        self.max_detail_width = width;
        self
    }

    fn write_label(&self, f: &mut fmt::Formatter<'_>, node: &dyn TreeNode) -> fmt::Result {
        write!(f, "{}", node.name())?;
        if let Some(details) = node.details() {
            write!(f, " ({})", truncate_string(&details, self.max_detail_width))?;
        }
        writeln!(f)
    }

    fn fmt_children(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &dyn TreeNode,
        prefix: &str,
    ) -> fmt::Result {
        let children = node.children();
        for (i, child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let connector = if is_last { "└─ " } else { "├─ " };
            write!(f, "{prefix}{connector}")?;
            self.write_label(f, *child)?;

            let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
            self.fmt_children(f, *child, &child_prefix)?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_label(f, self.root)?;
        self.fmt_children(f, self.root, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestNode {
        name: &'static str,
        details: Option<&'static str>,
        children: Vec<TestNode>,
    }

    impl TestNode {
        fn leaf(name: &'static str, details: &'static str) -> Self {
            Self {
                name,
                details: Some(details),
                children: vec![],
            }
        }
    }

    impl TreeNode for TestNode {
        fn name(&self) -> &str {
            self.name
        }

        fn children(&self) -> Vec<&dyn TreeNode> {
            self.children.iter().map(|c| c as &dyn TreeNode).collect()
        }

        fn details(&self) -> Option<String> {
            self.details.map(str::to_string)
        }
    }

    #[test]
    fn test_display_tree() {
        let tree = TestNode {
            name: "Join",
            details: Some("a, b"),
            children: vec![
                TestNode::leaf("Entity", "A"),
                TestNode::leaf("Entity", "B"),
            ],
        };

        let output = DisplayTree::new(&tree).to_string();
        assert_eq!(
            output,
            "Join (a, b)\n├─ Entity (A)\n└─ Entity (B)\n"
        );
    }

    #[test]
    fn test_detail_truncation() {
        let tree = TestNode::leaf("Filter", "p.name == \"Bob\"");
        let output = DisplayTree::new(&tree).with_max_detail_width(8).to_string();
        assert_eq!(output, "Filter (p.nam...)\n");
    }
}
