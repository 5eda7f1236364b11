//! Hygiene entry points for trees that must avoid externally reserved names.
//!
//! Callers that generate names of their own (e.g. for lifted parameter
//! bindings) pass them as a dangerous-name set; every binder in the
//! sanitized tree avoids them. None of these entry points permanentize
//! temporary identifiers.

use std::collections::HashSet;

use common_display::TreeNode;
use common_error::{invalid_param_err, QuarryResult};
use quarry_ast::{Ast, IdentName, NamingState, StatefulTransformer};

use super::AliasResolver;
use crate::rules::Optimizer;

fn seeded(dangerous: &HashSet<IdentName>) -> AliasResolver {
    AliasResolver::with_state(NamingState::seeded(dangerous.iter().cloned()), false)
}

/// Rename a function's parameters away from `dangerous`, then resolve the
/// queries in its body.
///
/// Fails with `InvalidParameter` unless `function` is an `Ast::Function`.
pub fn sanitize_function(function: Ast, dangerous: &HashSet<IdentName>) -> QuarryResult<Ast> {
    match function {
        Ast::Function { params, body } => Ok(seeded(dangerous).resolve_function(params, *body).0),
        other => invalid_param_err!(
            "sanitize_function expects a Function, got {}",
            TreeNode::name(&other)
        ),
    }
}

/// Rename a foreach action's binder away from `dangerous`, then resolve
/// its body.
///
/// Fails with `InvalidParameter` unless `action` is an `Ast::Foreach`.
pub fn sanitize_foreach(action: Ast, dangerous: &HashSet<IdentName>) -> QuarryResult<Ast> {
    match action {
        Ast::Foreach { .. } => Ok(seeded(dangerous).apply(action).0),
        other => invalid_param_err!(
            "sanitize_foreach expects a Foreach, got {}",
            TreeNode::name(&other)
        ),
    }
}

/// Resolve `query` against `dangerous`, then fuse the intermediate maps
/// the renaming may have exposed.
pub fn sanitize_query(query: Ast, dangerous: &HashSet<IdentName>) -> QuarryResult<Ast> {
    let (resolved, _) = seeded(dangerous).resolve(query);
    Ok(Optimizer::default().optimize(resolved)?.ast)
}
