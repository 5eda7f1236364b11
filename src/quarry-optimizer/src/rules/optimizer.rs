//! Fixpoint driver for rewrite rules.
//!
//! The optimizer applies its rules round after round until a full round
//! changes nothing or the iteration cap is reached.

use common_config::NormalizerConfig;
use common_error::QuarryResult;
use log::{debug, warn};
use quarry_ast::Ast;

use super::rule::{OptimizationRule, OptimizedAst};
use super::IntermediateMapFusion;

/// Applies rules to a query tree until nothing changes.
///
/// Every rule is applied once per round, in order. Rounds repeat until a
/// fixpoint is reached; hitting `max_iterations` first is logged and the
/// tree reached so far is returned.
pub struct Optimizer {
    /// The rules to apply (in order).
    rules: Vec<Box<dyn OptimizationRule>>,
    /// Configuration.
    config: NormalizerConfig,
}

impl Optimizer {
    /// Create a new optimizer with the given rules.
    pub fn new(rules: Vec<Box<dyn OptimizationRule>>) -> Self {
        Self {
            rules,
            config: NormalizerConfig::default(),
        }
    }

    /// Create a new optimizer with custom config.
    pub fn with_config(rules: Vec<Box<dyn OptimizationRule>>, config: NormalizerConfig) -> Self {
        Self { rules, config }
    }

    /// Add a rule to the optimizer.
    pub fn add_rule<R: OptimizationRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Names of the configured rules, in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// The active configuration.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Optimize a tree to fixpoint.
    pub fn optimize(&self, ast: Ast) -> QuarryResult<OptimizedAst> {
        self.config.validate()?;

        let mut result = OptimizedAst::new(ast);

        loop {
            if result.iterations >= self.config.max_iterations {
                warn!(
                    "Optimizer reached max iterations ({}), stopping",
                    self.config.max_iterations
                );
                break;
            }

            result.iterations += 1;
            let changed = self.round(&mut result)?;

            if !changed {
                debug!(
                    "No changes in iteration {}, reached fixpoint",
                    result.iterations
                );
                break;
            }
        }

        Ok(result)
    }

    /// Apply every rule exactly once (no fixpoint iteration).
    pub fn optimize_once(&self, ast: Ast) -> QuarryResult<OptimizedAst> {
        let mut result = OptimizedAst::new(ast);
        result.iterations = 1;
        self.round(&mut result)?;
        Ok(result)
    }

    /// One round over all rules. Returns whether any rule changed the tree.
    fn round(&self, result: &mut OptimizedAst) -> QuarryResult<bool> {
        let mut changed_this_round = false;

        for rule in &self.rules {
            let before = self.config.enable_trace.then(|| result.ast.explain());
            let current = std::mem::replace(&mut result.ast, Ast::NullValue);
            let applied = rule.apply(current)?;

            result.ast = applied.ast;
            if applied.changed {
                changed_this_round = true;
                debug!(
                    "Rule '{}' applied in iteration {}",
                    rule.name(),
                    result.iterations
                );
                result.record(rule.name(), before);
            }
        }

        Ok(changed_this_round)
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(vec![Box::new(IntermediateMapFusion)])
    }
}
