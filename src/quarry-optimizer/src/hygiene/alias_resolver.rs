//! Alias conflict resolution.
//!
//! Renames binders so that no two binders on one root-to-leaf path share a
//! name. Names allocated anywhere are remembered for the rest of the walk,
//! so a later sibling never reuses a name an earlier one took.

use log::trace;
use quarry_ast::{walk, Ast, Ident, NamingState, StatefulTransformer, Substitution};

/// A hygiene pass over one tree.
///
/// `permanentize` turns temporary identifiers into canonical names. Only
/// the final pass of a normalization pipeline may set it: earlier passes
/// do not know every outer name yet.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    state: NamingState,
    permanentize: bool,
}

impl AliasResolver {
    /// A resolver starting from an empty naming state.
    pub fn new(permanentize: bool) -> Self {
        Self::with_state(NamingState::new(), permanentize)
    }

    /// A resolver starting from `state`, e.g. names reserved elsewhere.
    pub fn with_state(state: NamingState, permanentize: bool) -> Self {
        Self {
            state,
            permanentize,
        }
    }

    /// Names taken so far.
    pub fn state(&self) -> &NamingState {
        &self.state
    }

    /// Whether temporary identifiers are made permanent.
    pub fn permanentize(&self) -> bool {
        self.permanentize
    }

    /// Consume the resolver, keeping its naming state.
    pub fn into_state(self) -> NamingState {
        self.state
    }

    /// Resolve a whole tree.
    pub fn resolve(self, ast: Ast) -> (Ast, Self) {
        self.apply(ast)
    }

    /// The name `ident` gets at this point of the walk.
    fn fresh_ident(&self, ident: &Ident) -> Ident {
        let fresh = if self.permanentize && ident.is_temporary() {
            self.state.fresh(&ident.permanent())
        } else {
            self.state.fresh(ident)
        };
        if fresh.name() != ident.name() {
            trace!("renamed binder {ident} to {fresh}");
        }
        fresh
    }

    fn bind(self, ident: &Ident) -> Self {
        Self {
            state: self.state.with(ident.ident_name()),
            permanentize: self.permanentize,
        }
    }

    /// Resolve a single-binder scope: `query` feeds `alias`, which is in
    /// scope in `body`.
    fn resolve_scope(
        self,
        query: Box<Ast>,
        alias: Ident,
        body: Box<Ast>,
    ) -> (Box<Ast>, Ident, Box<Ast>, Self) {
        // A join source is resolved as a join, never re-aliased from here.
        let (query, resolver) = if query.is_alias_free_source() {
            (query, self)
        } else {
            self.apply_boxed(query)
        };

        let fresh = resolver.fresh_ident(&alias);
        let body = rename(body, &alias, &fresh);
        let (body, resolver) = resolver.bind(&fresh).apply_boxed(body);
        (query, fresh, body, resolver)
    }

    /// Resolve binders introduced together, in order, over one body.
    fn resolve_params(self, params: Vec<Ident>, body: Box<Ast>) -> (Vec<Ident>, Box<Ast>, Self) {
        let mut resolver = self;
        let mut renaming = Substitution::new();
        let mut fresh_params = Vec::with_capacity(params.len());

        for param in params {
            let fresh = resolver.fresh_ident(&param);
            if fresh.name() != param.name() {
                renaming = renaming.with(&param, Ast::Ident(fresh.clone()));
            }
            resolver = resolver.bind(&fresh);
            fresh_params.push(fresh);
        }

        let body = Box::new((*body).substitute_all(&renaming));
        let (body, resolver) = resolver.apply_boxed(body);
        (fresh_params, body, resolver)
    }

    /// Resolve a function's parameters and body.
    pub fn resolve_function(self, params: Vec<Ident>, body: Ast) -> (Ast, Self) {
        let (params, body, resolver) = self.resolve_params(params, Box::new(body));
        (Ast::Function { params, body }, resolver)
    }
}

/// `body[from := to]`, skipped when the name did not change.
fn rename(body: Box<Ast>, from: &Ident, to: &Ident) -> Box<Ast> {
    if from.name() == to.name() {
        return body;
    }
    Box::new((*body).substitute(from, Ast::Ident(to.clone())))
}

impl StatefulTransformer for AliasResolver {
    #[allow(clippy::too_many_lines)]
    fn apply(self, ast: Ast) -> (Ast, Self) {
        match ast {
            Ast::Map { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::Map { query, alias, body }, r)
            }
            Ast::FlatMap { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::FlatMap { query, alias, body }, r)
            }
            Ast::ConcatMap { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::ConcatMap { query, alias, body }, r)
            }
            Ast::Filter { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::Filter { query, alias, body }, r)
            }
            Ast::GroupBy { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::GroupBy { query, alias, body }, r)
            }
            Ast::DistinctOn { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::DistinctOn { query, alias, body }, r)
            }
            Ast::Foreach { query, alias, body } => {
                let (query, alias, body, r) = self.resolve_scope(query, alias, body);
                (Ast::Foreach { query, alias, body }, r)
            }
            Ast::SortBy {
                query,
                alias,
                criteria,
                ordering,
            } => {
                let (query, alias, criteria, r) = self.resolve_scope(query, alias, criteria);
                (
                    Ast::SortBy {
                        query,
                        alias,
                        criteria,
                        ordering,
                    },
                    r,
                )
            }
            Ast::Join {
                kind,
                a,
                b,
                alias_a,
                alias_b,
                on,
            } => {
                let (a, r) = self.apply_boxed(a);
                let (b, r) = r.apply_boxed(b);

                let fresh_a = r.fresh_ident(&alias_a);
                let r = r.bind(&fresh_a);
                let fresh_b = r.fresh_ident(&alias_b);
                let r = r.bind(&fresh_b);

                let mut renaming = Substitution::new();
                if fresh_a.name() != alias_a.name() {
                    renaming = renaming.with(&alias_a, Ast::Ident(fresh_a.clone()));
                }
                if fresh_b.name() != alias_b.name() {
                    renaming = renaming.with(&alias_b, Ast::Ident(fresh_b.clone()));
                }
                let on = Box::new((*on).substitute_all(&renaming));
                let (on, r) = r.apply_boxed(on);

                (
                    Ast::Join {
                        kind,
                        a,
                        b,
                        alias_a: fresh_a,
                        alias_b: fresh_b,
                        on,
                    },
                    r,
                )
            }
            Ast::FlatJoin {
                kind,
                query,
                alias,
                on,
            } => {
                let (query, r) = self.apply_boxed(query);
                let fresh = r.fresh_ident(&alias);
                let on = rename(on, &alias, &fresh);
                let (on, r) = r.bind(&fresh).apply_boxed(on);
                (
                    Ast::FlatJoin {
                        kind,
                        query,
                        alias: fresh,
                        on,
                    },
                    r,
                )
            }
            Ast::Function { params, body } => {
                let (params, body, r) = self.resolve_params(params, body);
                (Ast::Function { params, body }, r)
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
            | Ast::Ident(_)
            | Ast::Property { .. }
            | Ast::BinaryOperation { .. }
            | Ast::UnaryOperation { .. }
            | Ast::Constant(_)
            | Ast::NullValue
            | Ast::Tuple(_)
            | Ast::CaseClass { .. }
            | Ast::FunctionApply { .. }
            | Ast::If { .. } => walk(self, ast),
        }
    }
}

/// Resolve `ast` from an empty naming state.
pub fn resolve_hygiene(ast: Ast, permanentize: bool) -> Ast {
    AliasResolver::new(permanentize).resolve(ast).0
}
