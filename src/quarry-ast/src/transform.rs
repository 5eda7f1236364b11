//! Threaded-state traversal.
//!
//! A [`StatefulTransformer`] is a value that carries its own state. Each
//! call to [`StatefulTransformer::apply`] consumes the transformer and hands
//! back the rewritten node together with the transformer holding the
//! updated state, so whatever one child allocated is visible when the next
//! child is transformed.
//!
//! Implementors override `apply` for the shapes they care about and call
//! [`walk`] for the rest.

use crate::ast::Ast;

/// A tree rewrite that threads its state through the traversal.
pub trait StatefulTransformer: Sized {
    /// Transform `ast`, returning the new node and the updated transformer.
    fn apply(self, ast: Ast) -> (Ast, Self) {
        walk(self, ast)
    }

    /// Transform a sequence left to right, threading state through it.
    fn apply_all(self, asts: Vec<Ast>) -> (Vec<Ast>, Self) {
        let mut out = Vec::with_capacity(asts.len());
        let mut t = self;
        for ast in asts {
            let (ast, next) = t.apply(ast);
            out.push(ast);
            t = next;
        }
        (out, t)
    }

    /// Transform a boxed child.
    fn apply_boxed(self, ast: Box<Ast>) -> (Box<Ast>, Self) {
        let (ast, t) = self.apply(*ast);
        (Box::new(ast), t)
    }
}

/// Generic recursion: transform every child of `ast` left to right with
/// `t.apply`, rebuilding the node around the results.
///
/// Binders are copied through unchanged.
pub fn walk<T: StatefulTransformer>(t: T, ast: Ast) -> (Ast, T) {
    match ast {
        Ast::Entity { .. } | Ast::Ident(_) | Ast::Constant(_) | Ast::NullValue => (ast, t),
        Ast::Infix {
            parts,
            params,
            pure,
            quat,
        } => {
            let (params, t) = t.apply_all(params);
            (
                Ast::Infix {
                    parts,
                    params,
                    pure,
                    quat,
                },
                t,
            )
        }
        Ast::Map { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::Map { query, alias, body }, t)
        }
        Ast::FlatMap { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::FlatMap { query, alias, body }, t)
        }
        Ast::ConcatMap { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::ConcatMap { query, alias, body }, t)
        }
        Ast::Filter { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::Filter { query, alias, body }, t)
        }
        Ast::SortBy {
            query,
            alias,
            criteria,
            ordering,
        } => {
            let (query, t) = t.apply_boxed(query);
            let (criteria, t) = t.apply_boxed(criteria);
            (
                Ast::SortBy {
                    query,
                    alias,
                    criteria,
                    ordering,
                },
                t,
            )
        }
        Ast::GroupBy { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::GroupBy { query, alias, body }, t)
        }
        Ast::DistinctOn { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::DistinctOn { query, alias, body }, t)
        }
        Ast::Join {
            kind,
            a,
            b,
            alias_a,
            alias_b,
            on,
        } => {
            let (a, t) = t.apply_boxed(a);
            let (b, t) = t.apply_boxed(b);
            let (on, t) = t.apply_boxed(on);
            (
                Ast::Join {
                    kind,
                    a,
                    b,
                    alias_a,
                    alias_b,
                    on,
                },
                t,
            )
        }
        Ast::FlatJoin {
            kind,
            query,
            alias,
            on,
        } => {
            let (query, t) = t.apply_boxed(query);
            let (on, t) = t.apply_boxed(on);
            (
                Ast::FlatJoin {
                    kind,
                    query,
                    alias,
                    on,
                },
                t,
            )
        }
        Ast::Nested(query) => {
            let (query, t) = t.apply_boxed(query);
            (Ast::Nested(query), t)
        }
        Ast::Distinct(query) => {
            let (query, t) = t.apply_boxed(query);
            (Ast::Distinct(query), t)
        }
        Ast::Take { query, n } => {
            let (query, t) = t.apply_boxed(query);
            let (n, t) = t.apply_boxed(n);
            (Ast::Take { query, n }, t)
        }
        Ast::Drop { query, n } => {
            let (query, t) = t.apply_boxed(query);
            let (n, t) = t.apply_boxed(n);
            (Ast::Drop { query, n }, t)
        }
        Ast::Aggregation { operator, ast } => {
            let (ast, t) = t.apply_boxed(ast);
            (Ast::Aggregation { operator, ast }, t)
        }
        Ast::Union { a, b } => {
            let (a, t) = t.apply_boxed(a);
            let (b, t) = t.apply_boxed(b);
            (Ast::Union { a, b }, t)
        }
        Ast::UnionAll { a, b } => {
            let (a, t) = t.apply_boxed(a);
            let (b, t) = t.apply_boxed(b);
            (Ast::UnionAll { a, b }, t)
        }
        Ast::Function { params, body } => {
            let (body, t) = t.apply_boxed(body);
            (Ast::Function { params, body }, t)
        }
        Ast::Foreach { query, alias, body } => {
            let (query, t) = t.apply_boxed(query);
            let (body, t) = t.apply_boxed(body);
            (Ast::Foreach { query, alias, body }, t)
        }
        Ast::Property { ast, name } => {
            let (ast, t) = t.apply_boxed(ast);
            (Ast::Property { ast, name }, t)
        }
        Ast::BinaryOperation { a, op, b } => {
            let (a, t) = t.apply_boxed(a);
            let (b, t) = t.apply_boxed(b);
            (Ast::BinaryOperation { a, op, b }, t)
        }
        Ast::UnaryOperation { op, ast } => {
            let (ast, t) = t.apply_boxed(ast);
            (Ast::UnaryOperation { op, ast }, t)
        }
        Ast::Tuple(values) => {
            let (values, t) = t.apply_all(values);
            (Ast::Tuple(values), t)
        }
        Ast::CaseClass { name, fields } => {
            let (keys, values): (Vec<String>, Vec<Ast>) = fields.into_iter().unzip();
            let (values, t) = t.apply_all(values);
            (
                Ast::CaseClass {
                    name,
                    fields: keys.into_iter().zip(values).collect(),
                },
                t,
            )
        }
        Ast::FunctionApply { function, values } => {
            let (function, t) = t.apply_boxed(function);
            let (values, t) = t.apply_all(values);
            (Ast::FunctionApply { function, values }, t)
        }
        Ast::If {
            condition,
            then,
            otherwise,
        } => {
            let (condition, t) = t.apply_boxed(condition);
            let (then, t) = t.apply_boxed(then);
            let (otherwise, t) = t.apply_boxed(otherwise);
            (
                Ast::If {
                    condition,
                    then,
                    otherwise,
                },
                t,
            )
        }
    }
}

/// Applies a function to each direct child, without recursing.
struct ChildMapper<F>(F);

impl<F> StatefulTransformer for ChildMapper<F>
where
    F: FnMut(Ast) -> Ast,
{
    fn apply(mut self, ast: Ast) -> (Ast, Self) {
        let ast = (self.0)(ast);
        (ast, self)
    }
}

impl Ast {
    /// Rebuild this node with `f` applied to each direct child.
    #[must_use]
    pub fn map_children<F>(self, f: F) -> Self
    where
        F: FnMut(Ast) -> Ast,
    {
        walk(ChildMapper(f), self).0
    }

    /// Rewrite this tree bottom-up: children first, then the node itself.
    #[must_use]
    pub fn transform_up<F>(self, mut f: F) -> Self
    where
        F: FnMut(Ast) -> Ast,
    {
        fn go<F: FnMut(Ast) -> Ast>(ast: Ast, f: &mut F) -> Ast {
            let ast = ast.map_children(|child| go(child, f));
            f(ast)
        }
        go(self, &mut f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::JoinType;

    /// Records the order in which entities are visited.
    struct EntityOrder(Vec<String>);

    impl StatefulTransformer for EntityOrder {
        fn apply(mut self, ast: Ast) -> (Ast, Self) {
            match ast {
                Ast::Entity { ref name, .. } => {
                    self.0.push(name.clone());
                    (ast, self)
                }
                other => walk(self, other),
            }
        }
    }

    #[test]
    fn test_walk_is_left_to_right() {
        let q = Ast::join(
            JoinType::Inner,
            Ast::union(Ast::entity("A"), Ast::entity("B")),
            Ast::entity("C"),
            "l",
            "r",
            Ast::unary(
                crate::ast::UnaryOperator::NonEmpty,
                Ast::entity("D"),
            ),
        );
        let (out, t) = EntityOrder(Vec::new()).apply(q.clone());
        assert_eq!(out, q);
        assert_eq!(t.0, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_map_children_is_shallow() {
        let q = Ast::map(Ast::entity("A"), "a", Ast::ident("a").prop("x"));
        let mut visited = 0;
        let out = q.map_children(|c| {
            visited += 1;
            c
        });
        assert_eq!(visited, 2);
        assert!(matches!(out, Ast::Map { .. }));
    }

    #[test]
    fn test_transform_up() {
        // Rename every entity; the rewrite must reach nested sources.
        let q = Ast::nested(Ast::filter(Ast::entity("A"), "a", Ast::ident("a")));
        let out = q.transform_up(|ast| match ast {
            Ast::Entity { quat, .. } => Ast::Entity {
                name: "B".into(),
                quat,
            },
            other => other,
        });
        assert!(out.contains(|n| matches!(n, Ast::Entity { name, .. } if name == "B")));
        assert!(!out.contains(|n| matches!(n, Ast::Entity { name, .. } if name == "A")));
    }
}
