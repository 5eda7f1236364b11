//! Rewrite rules over query trees and the log a fixpoint run keeps.

use common_display::indent;
use common_error::QuarryResult;
use quarry_ast::Ast;

/// A rewrite over a whole query tree.
///
/// A rule keeps the rows a query yields, their order where the query is
/// ordered, and its grouping boundaries. Applying it to the same tree twice
/// gives the same answer; the driver relies on that to detect a fixpoint.
pub trait OptimizationRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// One line for `explain`-style listings.
    fn description(&self) -> &'static str;

    fn apply(&self, ast: Ast) -> QuarryResult<Transformed>;
}

/// A tree coming out of a rule, tagged with whether the rule fired.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub ast: Ast,
    pub changed: bool,
}

impl Transformed {
    pub fn yes(ast: Ast) -> Self {
        Self { ast, changed: true }
    }

    pub fn no(ast: Ast) -> Self {
        Self {
            ast,
            changed: false,
        }
    }
}

/// One rewrite that fired, with the tree explained on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTrace {
    pub rule: &'static str,
    pub before: String,
    pub after: String,
}

/// A tree after normalization, with counters and the rewrites that fired.
///
/// `trace` stays empty unless tracing is enabled in the config.
#[derive(Debug, Clone)]
pub struct OptimizedAst {
    pub ast: Ast,
    /// Rounds for the optimizer, normalization cycles for the normalizer.
    pub iterations: usize,
    pub rules_applied: usize,
    pub trace: Vec<RuleTrace>,
}

impl OptimizedAst {
    pub fn new(ast: Ast) -> Self {
        Self {
            ast,
            iterations: 0,
            rules_applied: 0,
            trace: Vec::new(),
        }
    }

    /// Count one fired rewrite of `rule` and keep its before/after trees
    /// when `before` was captured.
    pub(crate) fn record(&mut self, rule: &'static str, before: Option<String>) {
        self.rules_applied += 1;
        if let Some(before) = before {
            self.trace.push(RuleTrace {
                rule,
                before,
                after: self.ast.explain(),
            });
        }
    }

    /// Render the rewrites that fired, each tree indented under its label.
    pub fn format_trace(&self) -> String {
        let mut output = format!(
            "{} rewrites over {} iterations\n",
            self.rules_applied, self.iterations
        );
        if self.trace.is_empty() {
            output.push_str("  (tracing disabled or nothing fired)\n");
            return output;
        }
        for (i, entry) in self.trace.iter().enumerate() {
            output.push_str(&format!("\n#{} {}\n", i + 1, entry.rule));
            output.push_str("before:\n");
            output.push_str(&indent(&entry.before, "  "));
            output.push_str("\nafter:\n");
            output.push_str(&indent(&entry.after, "  "));
            output.push('\n');
        }
        output
    }
}
