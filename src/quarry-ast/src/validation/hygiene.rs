//! Binder-name uniqueness along root-to-leaf paths.

use std::fmt;

use common_display::TreeNode;

use crate::ast::Ast;
use crate::ident::IdentName;

/// A binder that repeats a name already bound on the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HygieneViolation {
    /// The repeated name.
    pub name: IdentName,
    /// Label of the node whose binder repeats it.
    pub node: String,
    /// Nesting depth of that node, the root being 0.
    pub depth: usize,
}

impl fmt::Display for HygieneViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "binder `{}` of {} at depth {} is already bound on this path",
            self.name, self.node, self.depth
        )
    }
}

impl std::error::Error for HygieneViolation {}

/// Walks every root-to-leaf path and collects repeated binder names.
pub struct HygieneValidator;

impl HygieneValidator {
    /// Validate `ast`, returning every violation in traversal order.
    pub fn validate(ast: &Ast) -> Result<(), Vec<HygieneViolation>> {
        let mut violations = Vec::new();
        Self::visit(ast, &mut Vec::new(), 0, &mut violations);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn visit(
        ast: &Ast,
        scope: &mut Vec<IdentName>,
        depth: usize,
        violations: &mut Vec<HygieneViolation>,
    ) {
        let mark = scope.len();
        for binder in ast.own_binders() {
            if scope.iter().any(|s| s.as_str() == binder.name()) {
                violations.push(HygieneViolation {
                    name: binder.ident_name(),
                    node: TreeNode::name(ast).to_string(),
                    depth,
                });
            }
            scope.push(binder.ident_name());
        }

        for child in ast.children() {
            Self::visit(child, scope, depth + 1, violations);
        }

        scope.truncate(mark);
    }
}
