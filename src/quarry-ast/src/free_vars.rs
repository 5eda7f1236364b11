//! Free and bound identifier analysis.

use std::collections::HashSet;

use crate::ast::Ast;
use crate::ident::{Ident, IdentName};

impl Ast {
    /// Names referenced in this tree that no enclosing binder inside the
    /// tree binds.
    pub fn free_idents(&self) -> HashSet<IdentName> {
        let mut free = HashSet::new();
        collect_free(self, &mut Vec::new(), &mut free);
        free
    }

    /// Whether `name` occurs free in this tree.
    pub fn is_free(&self, name: &str) -> bool {
        self.free_idents().contains(name)
    }

    /// Every binder introduced anywhere in this tree.
    pub fn bound_idents(&self) -> HashSet<IdentName> {
        let mut bound = HashSet::new();
        collect_bound(self, &mut bound);
        bound
    }
}

fn collect_bound(ast: &Ast, bound: &mut HashSet<IdentName>) {
    bound.extend(ast.own_binders().into_iter().map(Ident::ident_name));
    for child in ast.children() {
        collect_bound(child, bound);
    }
}

/// Visit `body` with `binders` pushed on the scope stack.
fn collect_under(
    binders: &[&Ident],
    body: &Ast,
    scope: &mut Vec<IdentName>,
    free: &mut HashSet<IdentName>,
) {
    let depth = scope.len();
    scope.extend(binders.iter().map(|b| b.ident_name()));
    collect_free(body, scope, free);
    scope.truncate(depth);
}

fn collect_free(ast: &Ast, scope: &mut Vec<IdentName>, free: &mut HashSet<IdentName>) {
    match ast {
        Ast::Ident(ident) => {
            if !scope.iter().any(|s| s.as_str() == ident.name()) {
                free.insert(ident.ident_name());
            }
        }
        Ast::Map { query, alias, body }
        | Ast::FlatMap { query, alias, body }
        | Ast::ConcatMap { query, alias, body }
        | Ast::Filter { query, alias, body }
        | Ast::GroupBy { query, alias, body }
        | Ast::DistinctOn { query, alias, body }
        | Ast::Foreach { query, alias, body }
        | Ast::SortBy {
            query,
            alias,
            criteria: body,
            ..
        }
        | Ast::FlatJoin {
            query,
            alias,
            on: body,
            ..
        } => {
            collect_free(query, scope, free);
            collect_under(&[alias], body, scope, free);
        }
        Ast::Join {
            a,
            b,
            alias_a,
            alias_b,
            on,
            ..
        } => {
            collect_free(a, scope, free);
            collect_free(b, scope, free);
            collect_under(&[alias_a, alias_b], on, scope, free);
        }
        Ast::Function { params, body } => {
            let params: Vec<&Ident> = params.iter().collect();
            collect_under(&params, body, scope, free);
        }
        Ast::Entity { .. }
        | Ast::Infix { .. }
        | Ast::Nested(_)
        | Ast::Distinct(_)
        | Ast::Take { .. }
        | Ast::Drop { .. }
        | Ast::Aggregation { .. }
        | Ast::Union { .. }
        | Ast::UnionAll { .. }
        | Ast::Property { .. }
        | Ast::BinaryOperation { .. }
        | Ast::UnaryOperation { .. }
        | Ast::Constant(_)
        | Ast::NullValue
        | Ast::Tuple(_)
        | Ast::CaseClass { .. }
        | Ast::FunctionApply { .. }
        | Ast::If { .. } => {
            for child in ast.children() {
                collect_free(child, scope, free);
            }
        }
    }
}
