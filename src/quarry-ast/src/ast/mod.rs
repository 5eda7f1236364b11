//! The query tree.
//!
//! [`Ast`] is a closed sum type covering both monadic query combinators
//! (map/flatMap/filter/sortBy/groupBy/join over entities) and the scalar
//! expressions that appear in their bodies and predicates. Every pass in
//! this workspace matches it exhaustively.

mod display;
mod operators;

pub use operators::{
    AggregationOperator, BinaryOperator, Constant, JoinType, Ordering, UnaryOperator,
};

use serde::{Deserialize, Serialize};

use crate::ident::{Ident, Quat};

/// A node of the query tree.
///
/// Nodes are immutable values: every pass consumes a tree and produces a
/// new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ast {
    // ========== Sources ==========
    /// A named source table.
    Entity {
        /// Source name.
        name: String,
        /// Shape of one row.
        quat: Quat,
    },

    /// An opaque literal fragment spliced into the generated query.
    Infix {
        /// Literal text pieces; `params` are interleaved between them.
        parts: Vec<String>,
        /// Sub-trees spliced between `parts`.
        params: Vec<Ast>,
        /// Whether the fragment is free of side effects.
        pure: bool,
        /// Shape of the fragment's result.
        quat: Quat,
    },

    // ========== Binder-introducing queries ==========
    /// Projection.
    Map {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Projection body.
        body: Box<Ast>,
    },

    /// Monadic bind.
    FlatMap {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Body producing a query per element.
        body: Box<Ast>,
    },

    /// Bind over a collection-valued expression.
    ConcatMap {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Body producing a collection per element.
        body: Box<Ast>,
    },

    /// Predicate filter.
    Filter {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Predicate.
        body: Box<Ast>,
    },

    /// Ordering by a key.
    SortBy {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Sort key expression.
        criteria: Box<Ast>,
        /// Ordering of the key(s).
        ordering: Ordering,
    },

    /// Grouping by a key. Produces key/values pairs.
    GroupBy {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Grouping key.
        body: Box<Ast>,
    },

    /// Distinct on a key.
    DistinctOn {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Distinct key.
        body: Box<Ast>,
    },

    /// Two-sided join. The predicate sees both binders.
    Join {
        /// Join kind.
        kind: JoinType,
        /// Left source.
        a: Box<Ast>,
        /// Right source.
        b: Box<Ast>,
        /// Left binder.
        alias_a: Ident,
        /// Right binder.
        alias_b: Ident,
        /// Join predicate.
        on: Box<Ast>,
    },

    /// Join against the enclosing flatMap's element.
    FlatJoin {
        /// Join kind.
        kind: JoinType,
        /// Joined source.
        query: Box<Ast>,
        /// Binder for one joined element.
        alias: Ident,
        /// Join predicate.
        on: Box<Ast>,
    },

    // ========== Pass-through queries ==========
    /// Sub-query boundary.
    Nested(Box<Ast>),

    /// Duplicate elimination.
    Distinct(Box<Ast>),

    /// First `n` elements.
    Take {
        /// Source query.
        query: Box<Ast>,
        /// Element count.
        n: Box<Ast>,
    },

    /// All but the first `n` elements.
    Drop {
        /// Source query.
        query: Box<Ast>,
        /// Element count.
        n: Box<Ast>,
    },

    /// Aggregation over a whole query.
    Aggregation {
        /// Aggregation kind.
        operator: AggregationOperator,
        /// Aggregated query.
        ast: Box<Ast>,
    },

    /// Set union.
    Union {
        /// Left query.
        a: Box<Ast>,
        /// Right query.
        b: Box<Ast>,
    },

    /// Bag union.
    UnionAll {
        /// Left query.
        a: Box<Ast>,
        /// Right query.
        b: Box<Ast>,
    },

    // ========== Functions and actions ==========
    /// Lambda with an ordered parameter list.
    Function {
        /// Parameters.
        params: Vec<Ident>,
        /// Body.
        body: Box<Ast>,
    },

    /// An action run once per element.
    Foreach {
        /// Source query.
        query: Box<Ast>,
        /// Binder for one source element.
        alias: Ident,
        /// Action body.
        body: Box<Ast>,
    },

    // ========== Expressions ==========
    /// Variable reference.
    Ident(Ident),

    /// Field access.
    Property {
        /// Accessed value.
        ast: Box<Ast>,
        /// Field name.
        name: String,
    },

    /// Binary operation.
    BinaryOperation {
        /// Left operand.
        a: Box<Ast>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        b: Box<Ast>,
    },

    /// Unary operation.
    UnaryOperation {
        /// Operator.
        op: UnaryOperator,
        /// Operand.
        ast: Box<Ast>,
    },

    /// Literal constant.
    Constant(Constant),

    /// Null literal.
    NullValue,

    /// Tuple construction.
    Tuple(Vec<Ast>),

    /// Record construction with named fields.
    CaseClass {
        /// Record type name.
        name: String,
        /// Field names and values, in declaration order.
        fields: Vec<(String, Ast)>,
    },

    /// Function application.
    FunctionApply {
        /// Applied function.
        function: Box<Ast>,
        /// Arguments.
        values: Vec<Ast>,
    },

    /// Conditional expression.
    If {
        /// Condition.
        condition: Box<Ast>,
        /// Value when the condition holds.
        then: Box<Ast>,
        /// Value otherwise.
        otherwise: Box<Ast>,
    },
}

impl Ast {
    // ========== Constructors ==========

    /// A source table with an unknown row shape.
    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity {
            name: name.into(),
            quat: Quat::Unknown,
        }
    }

    /// A pure literal fragment.
    pub fn infix(parts: Vec<String>, params: Vec<Ast>) -> Self {
        Self::Infix {
            parts,
            params,
            pure: true,
            quat: Quat::Unknown,
        }
    }

    /// Variable reference.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(Ident::new(name))
    }

    /// Literal constant.
    pub fn constant(value: impl Into<Constant>) -> Self {
        Self::Constant(value.into())
    }

    /// Projection over `query`.
    pub fn map(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::Map {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Monadic bind over `query`.
    pub fn flat_map(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::FlatMap {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Collection bind over `query`.
    pub fn concat_map(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::ConcatMap {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Filter over `query`.
    pub fn filter(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::Filter {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Sort over `query`.
    pub fn sort_by(query: Self, alias: impl Into<Ident>, criteria: Self, ordering: Ordering) -> Self {
        Self::SortBy {
            query: Box::new(query),
            alias: alias.into(),
            criteria: Box::new(criteria),
            ordering,
        }
    }

    /// Grouping over `query`.
    pub fn group_by(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::GroupBy {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Distinct-on over `query`.
    pub fn distinct_on(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::DistinctOn {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Two-sided join.
    pub fn join(
        kind: JoinType,
        a: Self,
        b: Self,
        alias_a: impl Into<Ident>,
        alias_b: impl Into<Ident>,
        on: Self,
    ) -> Self {
        Self::Join {
            kind,
            a: Box::new(a),
            b: Box::new(b),
            alias_a: alias_a.into(),
            alias_b: alias_b.into(),
            on: Box::new(on),
        }
    }

    /// Flat join.
    pub fn flat_join(kind: JoinType, query: Self, alias: impl Into<Ident>, on: Self) -> Self {
        Self::FlatJoin {
            kind,
            query: Box::new(query),
            alias: alias.into(),
            on: Box::new(on),
        }
    }

    /// Sub-query boundary.
    pub fn nested(query: Self) -> Self {
        Self::Nested(Box::new(query))
    }

    /// Duplicate elimination.
    pub fn distinct(query: Self) -> Self {
        Self::Distinct(Box::new(query))
    }

    /// First `n` rows.
    pub fn take(query: Self, n: Self) -> Self {
        Self::Take {
            query: Box::new(query),
            n: Box::new(n),
        }
    }

    /// Skip `n` rows.
    pub fn drop(query: Self, n: Self) -> Self {
        Self::Drop {
            query: Box::new(query),
            n: Box::new(n),
        }
    }

    /// Aggregation over a query.
    pub fn aggregation(operator: AggregationOperator, ast: Self) -> Self {
        Self::Aggregation {
            operator,
            ast: Box::new(ast),
        }
    }

    /// Set union.
    pub fn union(a: Self, b: Self) -> Self {
        Self::Union {
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    /// Bag union.
    pub fn union_all(a: Self, b: Self) -> Self {
        Self::UnionAll {
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    /// Lambda.
    pub fn function(params: Vec<Ident>, body: Self) -> Self {
        Self::Function {
            params,
            body: Box::new(body),
        }
    }

    /// Per-element action.
    pub fn foreach(query: Self, alias: impl Into<Ident>, body: Self) -> Self {
        Self::Foreach {
            query: Box::new(query),
            alias: alias.into(),
            body: Box::new(body),
        }
    }

    /// Binary operation.
    pub fn binary(a: Self, op: BinaryOperator, b: Self) -> Self {
        Self::BinaryOperation {
            a: Box::new(a),
            op,
            b: Box::new(b),
        }
    }

    /// Unary operation.
    pub fn unary(op: UnaryOperator, ast: Self) -> Self {
        Self::UnaryOperation {
            op,
            ast: Box::new(ast),
        }
    }

    /// Conditional.
    pub fn if_then_else(condition: Self, then: Self, otherwise: Self) -> Self {
        Self::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Function application.
    pub fn apply(function: Self, values: Vec<Self>) -> Self {
        Self::FunctionApply {
            function: Box::new(function),
            values,
        }
    }

    // ========== Expression builders ==========

    /// Field access on this value.
    #[must_use]
    pub fn prop(self, name: impl Into<String>) -> Self {
        Self::Property {
            ast: Box::new(self),
            name: name.into(),
        }
    }

    /// Equality comparison.
    #[must_use]
    pub fn equal(self, other: Self) -> Self {
        Self::binary(self, BinaryOperator::Eq, other)
    }

    /// Logical AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, BinaryOperator::And, other)
    }

    /// String concatenation.
    #[must_use]
    pub fn concat(self, other: Self) -> Self {
        Self::binary(self, BinaryOperator::Concat, other)
    }

    /// Greater-than comparison.
    #[must_use]
    pub fn gt(self, other: Self) -> Self {
        Self::binary(self, BinaryOperator::Gt, other)
    }

    // ========== Recognizers ==========

    /// Whether this node introduces at least one binder.
    pub const fn is_binder_introducing(&self) -> bool {
        matches!(
            self,
            Self::Map { .. }
                | Self::FlatMap { .. }
                | Self::ConcatMap { .. }
                | Self::Filter { .. }
                | Self::SortBy { .. }
                | Self::GroupBy { .. }
                | Self::DistinctOn { .. }
                | Self::Join { .. }
                | Self::FlatJoin { .. }
                | Self::Function { .. }
                | Self::Foreach { .. }
        )
    }

    /// Whether this node wraps sub-queries without binding anything itself.
    pub const fn is_pass_through(&self) -> bool {
        matches!(
            self,
            Self::Nested(_)
                | Self::Distinct(_)
                | Self::Take { .. }
                | Self::Drop { .. }
                | Self::Aggregation { .. }
                | Self::Union { .. }
                | Self::UnionAll { .. }
        )
    }

    /// Whether this node is a query (as opposed to a scalar expression).
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Entity { .. } | Self::Infix { .. })
            || self.is_pass_through()
            || (self.is_binder_introducing() && !matches!(self, Self::Function { .. }))
    }

    /// Whether this source is guaranteed to introduce no identifiers: an
    /// `Entity` or `Infix`, possibly under a chain of `Nested`, `Take`,
    /// `Drop`, `Aggregation` and `Distinct` wrappers.
    ///
    /// Infix parameters and take/drop counts must not bind anything either.
    pub fn is_alias_free_source(&self) -> bool {
        match self {
            Self::Entity { .. } => true,
            Self::Infix { params, .. } => params.iter().all(|p| p.bound_idents().is_empty()),
            Self::Take { query, n } | Self::Drop { query, n } => {
                n.bound_idents().is_empty() && query.is_alias_free_source()
            }
            Self::Nested(query) | Self::Distinct(query) | Self::Aggregation { ast: query, .. } => {
                query.is_alias_free_source()
            }
            _ => false,
        }
    }

    /// The binders this node introduces itself, in declaration order.
    pub fn own_binders(&self) -> Vec<&Ident> {
        match self {
            Self::Map { alias, .. }
            | Self::FlatMap { alias, .. }
            | Self::ConcatMap { alias, .. }
            | Self::Filter { alias, .. }
            | Self::SortBy { alias, .. }
            | Self::GroupBy { alias, .. }
            | Self::DistinctOn { alias, .. }
            | Self::FlatJoin { alias, .. }
            | Self::Foreach { alias, .. } => vec![alias],
            Self::Join {
                alias_a, alias_b, ..
            } => vec![alias_a, alias_b],
            Self::Function { params, .. } => params.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Direct children, in left-to-right traversal order.
    pub fn children(&self) -> Vec<&Ast> {
        match self {
            Self::Entity { .. } | Self::Ident(_) | Self::Constant(_) | Self::NullValue => {
                Vec::new()
            }
            Self::Infix { params, .. } | Self::Tuple(params) => params.iter().collect(),
            Self::Map { query, body, .. }
            | Self::FlatMap { query, body, .. }
            | Self::ConcatMap { query, body, .. }
            | Self::Filter { query, body, .. }
            | Self::GroupBy { query, body, .. }
            | Self::DistinctOn { query, body, .. }
            | Self::Foreach { query, body, .. }
            | Self::SortBy {
                query,
                criteria: body,
                ..
            }
            | Self::FlatJoin {
                query, on: body, ..
            }
            | Self::Take { query, n: body }
            | Self::Drop { query, n: body } => vec![query.as_ref(), body.as_ref()],
            Self::Join { a, b, on, .. } => vec![a.as_ref(), b.as_ref(), on.as_ref()],
            Self::Nested(ast)
            | Self::Distinct(ast)
            | Self::Aggregation { ast, .. }
            | Self::Function { body: ast, .. }
            | Self::Property { ast, .. }
            | Self::UnaryOperation { ast, .. } => vec![ast.as_ref()],
            Self::Union { a, b }
            | Self::UnionAll { a, b }
            | Self::BinaryOperation { a, b, .. } => vec![a.as_ref(), b.as_ref()],
            Self::CaseClass { fields, .. } => fields.iter().map(|(_, v)| v).collect(),
            Self::FunctionApply { function, values } => {
                std::iter::once(function.as_ref()).chain(values.iter()).collect()
            }
            Self::If {
                condition,
                then,
                otherwise,
            } => vec![condition.as_ref(), then.as_ref(), otherwise.as_ref()],
        }
    }

    // ========== Analysis ==========

    /// Total number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Number of query nodes in this tree.
    pub fn query_count(&self) -> usize {
        usize::from(self.is_query())
            + self
                .children()
                .iter()
                .map(|c| c.query_count())
                .sum::<usize>()
    }

    /// Maximum depth of this tree.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    /// Check whether any node of this tree satisfies `predicate`.
    pub fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Ast) -> bool,
    {
        fn check<F>(ast: &Ast, predicate: &F) -> bool
        where
            F: Fn(&Ast) -> bool,
        {
            predicate(ast) || ast.children().iter().any(|c| check(c, predicate))
        }
        check(self, &predicate)
    }
}

impl From<Ident> for Ast {
    fn from(ident: Ident) -> Self {
        Self::Ident(ident)
    }
}
