//! Name hygiene for query trees.
//!
//! [`AliasResolver`] renames binders so that every root-to-leaf path binds
//! each name at most once. The sanitize entry points run it against an
//! externally supplied set of reserved names.

mod alias_resolver;
mod sanitize;

pub use alias_resolver::{resolve_hygiene, AliasResolver};
pub use sanitize::{sanitize_foreach, sanitize_function, sanitize_query};
