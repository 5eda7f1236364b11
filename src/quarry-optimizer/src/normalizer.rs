//! The normalization pipeline.
//!
//! Each cycle runs the optimizer to fixpoint and then restores hygiene
//! with a non-permanentizing resolver pass. Cycles repeat until a whole
//! cycle leaves the tree unchanged. One last resolver pass then turns
//! temporary identifiers into canonical names; it is the only pass that
//! does.

use common_config::NormalizerConfig;
use common_error::{QuarryError, QuarryResult};
use log::{debug, warn};
use quarry_ast::validation::validate_hygiene;
use quarry_ast::Ast;

use crate::hygiene::resolve_hygiene;
use crate::rules::{IntermediateMapFusion, OptimizedAst, Optimizer};

/// Drives fusion and hygiene resolution to a stable, hygienic tree.
pub struct Normalizer {
    optimizer: Optimizer,
    config: NormalizerConfig,
}

impl Normalizer {
    /// A normalizer running intermediate map fusion under `config`.
    pub fn new(config: NormalizerConfig) -> Self {
        let optimizer = Optimizer::with_config(vec![Box::new(IntermediateMapFusion)], config.clone());
        Self { optimizer, config }
    }

    /// A normalizer running a custom optimizer.
    pub fn with_optimizer(optimizer: Optimizer) -> Self {
        let config = optimizer.config().clone();
        Self { optimizer, config }
    }

    /// Normalize `ast`.
    pub fn normalize(&self, ast: Ast) -> QuarryResult<Ast> {
        Ok(self.normalize_traced(ast)?.ast)
    }

    /// Normalize `ast`, keeping counts and the rule trace.
    ///
    /// `iterations` counts normalization cycles.
    pub fn normalize_traced(&self, ast: Ast) -> QuarryResult<OptimizedAst> {
        self.config.validate()?;

        let mut result = OptimizedAst::new(ast);

        loop {
            if result.iterations >= self.config.max_iterations {
                warn!(
                    "Normalizer reached max cycles ({}), stopping",
                    self.config.max_iterations
                );
                break;
            }
            result.iterations += 1;

            let optimized = self.optimizer.optimize(result.ast.clone())?;
            result.rules_applied += optimized.rules_applied;
            result.trace.extend(optimized.trace);

            let resolved = resolve_hygiene(optimized.ast, false);
            if resolved == result.ast {
                debug!("Tree stable after {} cycles", result.iterations);
                break;
            }
            result.ast = resolved;
        }

        result.ast = resolve_hygiene(result.ast, true);
        ensure_permanent(&result.ast)?;

        if self.config.verify_hygiene {
            validate_hygiene(&result.ast)?;
        }

        Ok(result)
    }
}

/// After the final pass every binder carries a canonical name.
fn ensure_permanent(ast: &Ast) -> QuarryResult<()> {
    let temporary = ast.contains(|node| node.own_binders().iter().any(|b| b.is_temporary()));
    if temporary {
        return Err(QuarryError::internal(format!(
            "temporary binder left after the final resolver pass in {ast}"
        )));
    }
    Ok(())
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}
