//! Quarry - name hygiene and projection fusion for monadic query trees
//!
//! Quarry normalizes query trees before code generation: it renames bound
//! variables so that no root-to-leaf path binds a name twice, and fuses
//! intermediate projections into the combinators that consume them.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export member crates
pub use common_config as config;
pub use common_error as error;
pub use quarry_ast as ast;
pub use quarry_optimizer as optimizer;

/// Quarry version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
