//! Query tree model for Quarry.
//!
//! `quarry-ast` holds the closed query tree shared by every normalization
//! pass, plus the primitives those passes are built from:
//!
//! - **Identifiers**: [`Ident`] and its hygiene key [`IdentName`]; temporary
//!   identifiers from earlier rewrite phases
//! - **Naming state**: [`NamingState`], the persistent set of names in use,
//!   and its fresh-name allocation
//! - **Substitution**: capture-avoiding, simultaneous [`Substitution`]
//! - **Traversal**: [`StatefulTransformer`] and [`walk`] for passes that
//!   thread state across siblings
//! - **Validation**: hygiene checks over root-to-leaf paths
//!
//! # Example
//!
//! ```rust
//! use quarry_ast::{Ast, Ident};
//!
//! // query[Person].map(p => p.name).map(n => n + "!")
//! let q = Ast::map(
//!     Ast::map(Ast::entity("Person"), "p", Ast::ident("p").prop("name")),
//!     "n",
//!     Ast::ident("n").concat(Ast::constant("!")),
//! );
//! assert_eq!(q.query_count(), 3);
//!
//! let body = Ast::ident("n").concat(Ast::constant("!"));
//! let fused = body.substitute(&Ident::new("n"), Ast::ident("p").prop("name"));
//! assert_eq!(fused.to_string(), "p.name + \"!\"");
//! ```

pub mod ast;
mod free_vars;
mod ident;
mod naming;
mod proptest_utils;
mod subst;
mod transform;
pub mod validation;

pub use ast::{
    AggregationOperator, Ast, BinaryOperator, Constant, JoinType, Ordering, UnaryOperator,
};
pub use ident::{Ident, IdentKind, IdentName, Quat, PERMANENT_BASE};
pub use naming::NamingState;
pub use subst::Substitution;
pub use transform::{walk, StatefulTransformer};
