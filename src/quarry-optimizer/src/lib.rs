//! Query normalization for Quarry.
//!
//! Two passes cooperate here:
//!
//! - **Intermediate map fusion** ([`simplify`], [`IntermediateMapFusion`])
//!   merges projections into the combinator that consumes them
//! - **Alias conflict resolution** ([`AliasResolver`], [`resolve_hygiene`])
//!   renames binders so that no root-to-leaf path binds a name twice
//!
//! [`Normalizer`] alternates them until the tree is stable, then finalizes
//! temporary identifiers.
//!
//! # Example
//!
//! ```rust
//! use quarry_ast::Ast;
//! use quarry_optimizer::Normalizer;
//!
//! // query[Person].map(p => p.name).filter(n => n == "Bob")
//! let q = Ast::filter(
//!     Ast::map(Ast::entity("Person"), "p", Ast::ident("p").prop("name")),
//!     "n",
//!     Ast::ident("n").equal(Ast::constant("Bob")),
//! );
//! let normalized = Normalizer::default().normalize(q).unwrap();
//! assert_eq!(
//!     normalized.to_string(),
//!     "query[Person].filter(p => p.name == \"Bob\").map(p1 => p1.name)"
//! );
//! ```

mod hygiene;
mod normalizer;
mod rules;

pub use hygiene::{
    resolve_hygiene, sanitize_foreach, sanitize_function, sanitize_query, AliasResolver,
};
pub use normalizer::Normalizer;
pub use rules::{
    simplify, IntermediateMapFusion, OptimizationRule, OptimizedAst, Optimizer, RuleTrace,
    Transformed,
};

use common_error::QuarryResult;
use quarry_ast::Ast;

/// Normalize a tree with the default configuration.
pub fn normalize(ast: Ast) -> QuarryResult<Ast> {
    Normalizer::default().normalize(ast)
}
