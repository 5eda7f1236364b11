//! Rendering of query trees.
//!
//! `Display` gives a one-line, method-chain rendering
//! (`query[Person].map(p => p.name)`); [`Ast::explain`] renders the query
//! skeleton as an indented tree with bodies shown inline.

use std::fmt;

use common_display::{DisplayTree, TreeNode};

use super::{Ast, UnaryOperator};
use crate::ident::Ident;

fn join_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render an operand, parenthesizing nested operators.
fn operand(ast: &Ast) -> String {
    match ast {
        Ast::BinaryOperation { .. } | Ast::If { .. } => format!("({ast})"),
        _ => ast.to_string(),
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { name, .. } => write!(f, "query[{name}]"),
            Self::Infix { parts, params, .. } => {
                write!(f, "infix\"")?;
                for (i, part) in parts.iter().enumerate() {
                    write!(f, "{part}")?;
                    if let Some(param) = params.get(i) {
                        write!(f, "${{{param}}}")?;
                    }
                }
                write!(f, "\"")
            }
            Self::Map { query, alias, body } => write!(f, "{query}.map({alias} => {body})"),
            Self::FlatMap { query, alias, body } => {
                write!(f, "{query}.flatMap({alias} => {body})")
            }
            Self::ConcatMap { query, alias, body } => {
                write!(f, "{query}.concatMap({alias} => {body})")
            }
            Self::Filter { query, alias, body } => {
                write!(f, "{query}.filter({alias} => {body})")
            }
            Self::SortBy {
                query,
                alias,
                criteria,
                ordering,
            } => write!(f, "{query}.sortBy({alias} => {criteria})({ordering})"),
            Self::GroupBy { query, alias, body } => {
                write!(f, "{query}.groupBy({alias} => {body})")
            }
            Self::DistinctOn { query, alias, body } => {
                write!(f, "{query}.distinctOn({alias} => {body})")
            }
            Self::Join {
                kind,
                a,
                b,
                alias_a,
                alias_b,
                on,
            } => write!(
                f,
                "{a}.{}({b}).on(({alias_a}, {alias_b}) => {on})",
                kind.method_name()
            ),
            Self::FlatJoin {
                kind,
                query,
                alias,
                on,
            } => write!(f, "{}({query}).on({alias} => {on})", kind.method_name()),
            Self::Nested(query) => write!(f, "{query}.nested"),
            Self::Distinct(query) => write!(f, "{query}.distinct"),
            Self::Take { query, n } => write!(f, "{query}.take({n})"),
            Self::Drop { query, n } => write!(f, "{query}.drop({n})"),
            Self::Aggregation { operator, ast } => write!(f, "{ast}.{operator}"),
            Self::Union { a, b } => write!(f, "{a}.union({b})"),
            Self::UnionAll { a, b } => write!(f, "{a}.unionAll({b})"),
            Self::Function { params, body } => write!(f, "({}) => {body}", join_list(params)),
            Self::Foreach { query, alias, body } => {
                write!(f, "{query}.foreach({alias} => {body})")
            }
            Self::Ident(ident) => write!(f, "{ident}"),
            Self::Property { ast, name } => write!(f, "{}.{name}", operand(ast)),
            Self::BinaryOperation { a, op, b } => {
                write!(f, "{} {op} {}", operand(a), operand(b))
            }
            Self::UnaryOperation { op, ast } => match op {
                UnaryOperator::Not => write!(f, "!{}", operand(ast)),
                UnaryOperator::Negate => write!(f, "-{}", operand(ast)),
                UnaryOperator::IsEmpty => write!(f, "{}.isEmpty", operand(ast)),
                UnaryOperator::NonEmpty => write!(f, "{}.nonEmpty", operand(ast)),
            },
            Self::Constant(c) => write!(f, "{c}"),
            Self::NullValue => write!(f, "null"),
            Self::Tuple(values) => write!(f, "({})", join_list(values)),
            Self::CaseClass { name, fields } => {
                let fields = fields
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{name}({fields})")
            }
            Self::FunctionApply { function, values } => {
                write!(f, "{}.apply({})", operand(function), join_list(values))
            }
            Self::If {
                condition,
                then,
                otherwise,
            } => write!(f, "if ({condition}) {then} else {otherwise}"),
        }
    }
}

fn lambda(alias: &Ident, body: &Ast) -> String {
    format!("{alias} => {body}")
}

impl TreeNode for Ast {
    fn name(&self) -> &str {
        match self {
            Self::Entity { .. } => "Entity",
            Self::Infix { .. } => "Infix",
            Self::Map { .. } => "Map",
            Self::FlatMap { .. } => "FlatMap",
            Self::ConcatMap { .. } => "ConcatMap",
            Self::Filter { .. } => "Filter",
            Self::SortBy { .. } => "SortBy",
            Self::GroupBy { .. } => "GroupBy",
            Self::DistinctOn { .. } => "DistinctOn",
            Self::Join { .. } => "Join",
            Self::FlatJoin { .. } => "FlatJoin",
            Self::Nested(_) => "Nested",
            Self::Distinct(_) => "Distinct",
            Self::Take { .. } => "Take",
            Self::Drop { .. } => "Drop",
            Self::Aggregation { .. } => "Aggregation",
            Self::Union { .. } => "Union",
            Self::UnionAll { .. } => "UnionAll",
            Self::Function { .. } => "Function",
            Self::Foreach { .. } => "Foreach",
            Self::Ident(_)
            | Self::Property { .. }
            | Self::BinaryOperation { .. }
            | Self::UnaryOperation { .. }
            | Self::Constant(_)
            | Self::NullValue
            | Self::Tuple(_)
            | Self::CaseClass { .. }
            | Self::FunctionApply { .. }
            | Self::If { .. } => "Expr",
        }
    }

    /// Only the query skeleton is drawn as children; bodies go in details.
    fn children(&self) -> Vec<&dyn TreeNode> {
        match self {
            Self::Entity { .. } | Self::Infix { .. } => Vec::new(),
            Self::Map { query, .. }
            | Self::FlatMap { query, .. }
            | Self::ConcatMap { query, .. }
            | Self::Filter { query, .. }
            | Self::SortBy { query, .. }
            | Self::GroupBy { query, .. }
            | Self::DistinctOn { query, .. }
            | Self::FlatJoin { query, .. }
            | Self::Foreach { query, .. }
            | Self::Nested(query)
            | Self::Distinct(query)
            | Self::Take { query, .. }
            | Self::Drop { query, .. }
            | Self::Aggregation { ast: query, .. } => vec![query.as_ref() as &dyn TreeNode],
            Self::Join { a, b, .. } | Self::Union { a, b } | Self::UnionAll { a, b } => {
                vec![a.as_ref() as &dyn TreeNode, b.as_ref() as &dyn TreeNode]
            }
            Self::Function { .. }
            | Self::Ident(_)
            | Self::Property { .. }
            | Self::BinaryOperation { .. }
            | Self::UnaryOperation { .. }
            | Self::Constant(_)
            | Self::NullValue
            | Self::Tuple(_)
            | Self::CaseClass { .. }
            | Self::FunctionApply { .. }
            | Self::If { .. } => Vec::new(),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Entity { name, .. } => Some(name.clone()),
            Self::Infix { .. } => Some(self.to_string()),
            Self::Map { alias, body, .. }
            | Self::FlatMap { alias, body, .. }
            | Self::ConcatMap { alias, body, .. }
            | Self::Filter { alias, body, .. }
            | Self::GroupBy { alias, body, .. }
            | Self::DistinctOn { alias, body, .. }
            | Self::Foreach { alias, body, .. } => Some(lambda(alias, body)),
            Self::SortBy {
                alias,
                criteria,
                ordering,
                ..
            } => Some(format!("{}, {ordering}", lambda(alias, criteria))),
            Self::Join {
                kind,
                alias_a,
                alias_b,
                on,
                ..
            } => Some(format!("{kind:?}, ({alias_a}, {alias_b}) => {on}")),
            Self::FlatJoin {
                kind, alias, on, ..
            } => Some(format!("{kind:?}, {}", lambda(alias, on))),
            Self::Take { n, .. } | Self::Drop { n, .. } => Some(n.to_string()),
            Self::Aggregation { operator, .. } => Some(operator.to_string()),
            Self::Nested(_) | Self::Distinct(_) | Self::Union { .. } | Self::UnionAll { .. } => {
                None
            }
            Self::Function { .. }
            | Self::Ident(_)
            | Self::Property { .. }
            | Self::BinaryOperation { .. }
            | Self::UnaryOperation { .. }
            | Self::Constant(_)
            | Self::NullValue
            | Self::Tuple(_)
            | Self::CaseClass { .. }
            | Self::FunctionApply { .. }
            | Self::If { .. } => Some(self.to_string()),
        }
    }
}

impl Ast {
    /// Tree-formatted explanation of this query.
    pub fn explain(&self) -> String {
        DisplayTree::new(self).to_string()
    }
}
