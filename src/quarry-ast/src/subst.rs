//! Capture-avoiding substitution.
//!
//! Replaces free occurrences of identifiers with replacement trees. A
//! binder with the same name as a source shadows it. A binder that would
//! capture a name free in a replacement is renamed first; on trees already
//! made hygienic by the alias resolver this never happens and the
//! substitution is purely structural.

use std::collections::{HashMap, HashSet};

use crate::ast::Ast;
use crate::ident::{Ident, IdentName};
use crate::naming::NamingState;

/// A simultaneous mapping from identifiers to replacement trees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    map: HashMap<IdentName, Ast>,
}

impl Substitution {
    /// An empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a single identifier.
    pub fn single(from: &Ident, to: Ast) -> Self {
        Self::new().with(from, to)
    }

    /// This substitution plus `from := to`. A later mapping for the same
    /// name replaces an earlier one.
    #[must_use]
    pub fn with(mut self, from: &Ident, to: Ast) -> Self {
        self.map.insert(from.ident_name(), to);
        self
    }

    /// Whether there is nothing to substitute.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The replacement for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Ast> {
        self.map.get(name)
    }

    /// Names being replaced.
    pub fn sources(&self) -> impl Iterator<Item = &IdentName> {
        self.map.keys()
    }

    /// Names free in any replacement.
    pub fn free_in_replacements(&self) -> HashSet<IdentName> {
        self.map.values().flat_map(Ast::free_idents).collect()
    }

    /// The mappings still live under `binders`: not shadowed by one of
    /// them and free in the scope body.
    fn live_under(&self, binders: &[Ident], free: &HashSet<IdentName>) -> Self {
        let map = self
            .map
            .iter()
            .filter(|(name, _)| free.contains(*name))
            .filter(|(name, _)| !binders.iter().any(|b| b.name() == name.as_str()))
            .map(|(name, ast)| (name.clone(), ast.clone()))
            .collect();
        Self { map }
    }
}

impl Ast {
    /// Replace free occurrences of `from` with `to`.
    #[must_use]
    pub fn substitute(self, from: &Ident, to: Ast) -> Self {
        self.substitute_all(&Substitution::single(from, to))
    }

    /// Apply every mapping of `subst` simultaneously.
    #[must_use]
    pub fn substitute_all(self, subst: &Substitution) -> Self {
        if subst.is_empty() {
            return self;
        }
        substitute(self, subst)
    }
}

fn substitute_boxed(ast: Box<Ast>, subst: &Substitution) -> Box<Ast> {
    Box::new(substitute(*ast, subst))
}

/// Substitute inside the scope of `binders`, renaming any binder that would
/// capture a free name of the replacements.
fn substitute_under(binders: Vec<Ident>, body: Ast, subst: &Substitution) -> (Vec<Ident>, Ast) {
    let free = body.free_idents();
    let inner = subst.live_under(&binders, &free);
    if inner.is_empty() {
        return (binders, body);
    }

    let capturing = inner.free_in_replacements();
    if !binders.iter().any(|b| capturing.contains(b.name())) {
        return (binders, substitute(body, &inner));
    }

    let mut avoid = NamingState::seeded(
        capturing
            .iter()
            .chain(inner.sources())
            .chain(free.iter())
            .cloned()
            .chain(binders.iter().map(Ident::ident_name)),
    );
    let mut renaming = Substitution::new();
    let mut renamed = Vec::with_capacity(binders.len());
    for binder in binders {
        if capturing.contains(binder.name()) {
            let fresh = avoid.fresh(&binder);
            avoid = avoid.with(fresh.ident_name());
            renaming = renaming.with(&binder, Ast::Ident(fresh.clone()));
            renamed.push(fresh);
        } else {
            renamed.push(binder);
        }
    }
    let body = substitute(body, &renaming);
    (renamed, substitute(body, &inner))
}

/// Substitute under a single binder.
fn substitute_under_one(alias: Ident, body: Box<Ast>, subst: &Substitution) -> (Ident, Box<Ast>) {
    let (mut binders, body) = substitute_under(vec![alias], *body, subst);
    let alias = binders.remove(0);
    (alias, Box::new(body))
}

fn substitute(ast: Ast, subst: &Substitution) -> Ast {
    match ast {
        Ast::Ident(ident) => match subst.get(ident.name()) {
            Some(replacement) => replacement.clone(),
            None => Ast::Ident(ident),
        },
        Ast::Map { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::Map { query, alias, body }
        }
        Ast::FlatMap { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::FlatMap { query, alias, body }
        }
        Ast::ConcatMap { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::ConcatMap { query, alias, body }
        }
        Ast::Filter { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::Filter { query, alias, body }
        }
        Ast::GroupBy { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::GroupBy { query, alias, body }
        }
        Ast::DistinctOn { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::DistinctOn { query, alias, body }
        }
        Ast::Foreach { query, alias, body } => {
            let query = substitute_boxed(query, subst);
            let (alias, body) = substitute_under_one(alias, body, subst);
            Ast::Foreach { query, alias, body }
        }
        Ast::SortBy {
            query,
            alias,
            criteria,
            ordering,
        } => {
            let query = substitute_boxed(query, subst);
            let (alias, criteria) = substitute_under_one(alias, criteria, subst);
            Ast::SortBy {
                query,
                alias,
                criteria,
                ordering,
            }
        }
        Ast::FlatJoin {
            kind,
            query,
            alias,
            on,
        } => {
            let query = substitute_boxed(query, subst);
            let (alias, on) = substitute_under_one(alias, on, subst);
            Ast::FlatJoin {
                kind,
                query,
                alias,
                on,
            }
        }
        Ast::Join {
            kind,
            a,
            b,
            alias_a,
            alias_b,
            on,
        } => {
            let a = substitute_boxed(a, subst);
            let b = substitute_boxed(b, subst);
            let (mut aliases, on) = substitute_under(vec![alias_a, alias_b], *on, subst);
            let alias_b = aliases.remove(1);
            let alias_a = aliases.remove(0);
            Ast::Join {
                kind,
                a,
                b,
                alias_a,
                alias_b,
                on: Box::new(on),
            }
        }
        Ast::Function { params, body } => {
            let (params, body) = substitute_under(params, *body, subst);
            Ast::Function {
                params,
                body: Box::new(body),
            }
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
        | Ast::If { .. } => ast.map_children(|child| substitute(child, subst)),
    }
}
