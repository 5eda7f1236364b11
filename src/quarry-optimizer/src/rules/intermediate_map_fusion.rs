//! Intermediate map fusion.
//!
//! Removes projections that only feed another combinator. Given a source
//! `query[a].map(b => c)`:
//!
//! ```text
//! Map(a, b, b)                  => a
//! Map(Map(a, b, c), d, e)       => Map(a, b, e[d := c])
//! FlatMap(Map(a, b, c), d, e)   => FlatMap(a, b, e[d := c])
//! Filter(Map(a, b, c), d, e)    => Map(Filter(a, b, e[d := c]), b, c)
//! SortBy(Map(a, b, c), d, e, o) => Map(SortBy(a, b, e[d := c], o), b, c)
//! ```
//!
//! A map over a `GroupBy` is never fused into: it reshapes the grouped
//! key/values pairs that later combinators rely on.

use std::fmt;

use common_error::QuarryResult;
use log::trace;
use quarry_ast::{Ast, Ident};

use super::rule::{OptimizationRule, Transformed};

/// Which fusion fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fusion {
    Identity,
    MapMap,
    MapFlatMap,
    MapFilter,
    MapSortBy,
}

impl fmt::Display for Fusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity map",
            Self::MapMap => "map-map",
            Self::MapFlatMap => "map-flatMap",
            Self::MapFilter => "map-filter",
            Self::MapSortBy => "map-sortBy",
        };
        write!(f, "{name}")
    }
}

/// Try one fusion step at the root of `ast`.
///
/// Returns `None` when no rule matches. Does not look below the root.
pub fn simplify(ast: &Ast) -> Option<Ast> {
    fuse_once(ast).map(|(_, fused)| fused)
}

/// `query` is a `Map` reading directly from a `GroupBy`.
fn is_map_over_group_by(query: &Ast) -> bool {
    matches!(query, Ast::Map { query, .. } if matches!(query.as_ref(), Ast::GroupBy { .. }))
}

/// The parts of `query` when it is a `Map`.
fn as_map(query: &Ast) -> Option<(&Ast, &Ident, &Ast)> {
    match query {
        Ast::Map { query, alias, body } => Some((query.as_ref(), alias, body.as_ref())),
        _ => None,
    }
}

/// `e[d := c]`.
fn inline(e: &Ast, d: &Ident, c: &Ast) -> Box<Ast> {
    Box::new(e.clone().substitute(d, c.clone()))
}

#[allow(clippy::too_many_lines)]
fn fuse_once(ast: &Ast) -> Option<(Fusion, Ast)> {
    match ast {
        Ast::Map { query, alias, body } => {
            if is_map_over_group_by(query) {
                return None;
            }
            if matches!(body.as_ref(), Ast::Ident(ident) if ident == alias) {
                return Some((Fusion::Identity, query.as_ref().clone()));
            }
            let (a, b, c) = as_map(query)?;
            Some((
                Fusion::MapMap,
                Ast::Map {
                    query: Box::new(a.clone()),
                    alias: b.clone(),
                    body: inline(body, alias, c),
                },
            ))
        }
        Ast::FlatMap { query, alias, body } => {
            if is_map_over_group_by(query) {
                return None;
            }
            let (a, b, c) = as_map(query)?;
            Some((
                Fusion::MapFlatMap,
                Ast::FlatMap {
                    query: Box::new(a.clone()),
                    alias: b.clone(),
                    body: inline(body, alias, c),
                },
            ))
        }
        Ast::Filter { query, alias, body } => {
            if is_map_over_group_by(query) {
                return None;
            }
            let (a, b, c) = as_map(query)?;
            let filter = Ast::Filter {
                query: Box::new(a.clone()),
                alias: b.clone(),
                body: inline(body, alias, c),
            };
            Some((Fusion::MapFilter, Ast::map(filter, b.clone(), c.clone())))
        }
        Ast::SortBy {
            query,
            alias,
            criteria,
            ordering,
        } => {
            if is_map_over_group_by(query) {
                return None;
            }
            let (a, b, c) = as_map(query)?;
            let sort = Ast::SortBy {
                query: Box::new(a.clone()),
                alias: b.clone(),
                criteria: inline(criteria, alias, c),
                ordering: ordering.clone(),
            };
            Some((Fusion::MapSortBy, Ast::map(sort, b.clone(), c.clone())))
        }
        Ast::Entity { .. }
        | Ast::Infix { .. }
        | Ast::ConcatMap { .. }
        | Ast::GroupBy { .. }
        | Ast::DistinctOn { .. }
        | Ast::Join { .. }
        | Ast::FlatJoin { .. }
        | Ast::Nested(_)
        | Ast::Distinct(_)
        | Ast::Take { .. }
        | Ast::Drop { .. }
        | Ast::Aggregation { .. }
        | Ast::Union { .. }
        | Ast::UnionAll { .. }
        | Ast::Function { .. }
        | Ast::Foreach { .. }
        | Ast::Ident(_)
        | Ast::Property { .. }
        | Ast::BinaryOperation { .. }
        | Ast::UnaryOperation { .. }
        | Ast::Constant(_)
        | Ast::NullValue
        | Ast::Tuple(_)
        | Ast::CaseClass { .. }
        | Ast::FunctionApply { .. }
        | Ast::If { .. } => None,
    }
}

/// Fuse intermediate maps everywhere in the tree.
///
/// Children are fused before their parent, and each node is rewritten
/// until no fusion matches it any more.
pub struct IntermediateMapFusion;

impl OptimizationRule for IntermediateMapFusion {
    fn name(&self) -> &'static str {
        "IntermediateMapFusion"
    }

    fn description(&self) -> &'static str {
        "Fuse projections into the combinator that consumes them"
    }

    fn apply(&self, ast: Ast) -> QuarryResult<Transformed> {
        let mut changed = false;
        let ast = ast.transform_up(|mut node| {
            while let Some((fusion, fused)) = fuse_once(&node) {
                trace!("fused {fusion}: {node} => {fused}");
                changed = true;
                node = fused;
            }
            node
        });

        if changed {
            Ok(Transformed::yes(ast))
        } else {
            Ok(Transformed::no(ast))
        }
    }
}
