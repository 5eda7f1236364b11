//! Rewrite rules for query trees.
//!
//! A rewrite is legal only if it preserves:
//!
//! 1. **Row semantics**: the same elements are produced
//! 2. **Ordering**: sorted queries stay sorted by the same keys
//! 3. **Grouping boundaries**: nothing is moved across a `groupBy`
//! 4. **Binding**: no free identifier becomes bound by a different binder
//!
//! Rewrites may break name hygiene; the alias resolver restores it after
//! every optimizer run.

mod intermediate_map_fusion;
mod optimizer;
mod rule;

pub use intermediate_map_fusion::{simplify, IntermediateMapFusion};
pub use optimizer::Optimizer;
pub use rule::{OptimizationRule, OptimizedAst, RuleTrace, Transformed};
