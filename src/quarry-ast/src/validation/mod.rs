//! Validation for query trees.
//!
//! The only check is name hygiene: along every path from the root to a
//! leaf, the binders introduced by the nodes on that path must have
//! pairwise distinct names. A binder counts on the paths into every child
//! of the node that introduces it, including the source position.
//!
//! # Example
//!
//! ```rust
//! use quarry_ast::Ast;
//! use quarry_ast::validation::validate_hygiene;
//!
//! let ok = Ast::map(Ast::entity("Person"), "p", Ast::ident("p").prop("name"));
//! assert!(validate_hygiene(&ok).is_ok());
//!
//! let shadowed = Ast::map(ok, "p", Ast::ident("p"));
//! assert!(validate_hygiene(&shadowed).is_err());
//! ```

mod hygiene;

pub use hygiene::{HygieneValidator, HygieneViolation};

use common_error::{QuarryError, QuarryResult};

use crate::ast::Ast;

/// Check `ast` for hygiene, reporting the first violation found.
pub fn validate_hygiene(ast: &Ast) -> QuarryResult<()> {
    HygieneValidator::validate(ast).map_err(|violations| {
        let first = violations
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        if violations.len() > 1 {
            QuarryError::hygiene(format!("{first} (and {} more)", violations.len() - 1))
        } else {
            QuarryError::hygiene(first)
        }
    })
}
