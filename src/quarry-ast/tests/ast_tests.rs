//! Integration tests for quarry-ast
//!
//! These cover the public surface used by the normalization passes:
//! threaded traversal with real state, substitution over query shapes and
//! hygiene validation.

use quarry_ast::validation::{validate_hygiene, HygieneValidator};
use quarry_ast::*;

/// Collects every binder name in traversal order.
#[derive(Default)]
struct BinderLog(Vec<String>);

impl StatefulTransformer for BinderLog {
    fn apply(mut self, ast: Ast) -> (Ast, Self) {
        self.0
            .extend(ast.own_binders().into_iter().map(|b| b.name().to_string()));
        walk(self, ast)
    }
}

fn people_join() -> Ast {
    Ast::join(
        JoinType::Inner,
        Ast::map(Ast::entity("Person"), "p", Ast::ident("p")),
        Ast::filter(Ast::entity("Address"), "d", Ast::ident("d").prop("valid")),
        "a",
        "b",
        Ast::ident("a").prop("id").equal(Ast::ident("b").prop("owner")),
    )
}

#[test]
fn test_state_threads_left_to_right() {
    let (out, log) = BinderLog::default().apply(people_join());
    assert_eq!(log.0, vec!["a", "b", "p", "d"]);
    assert_eq!(out, people_join());
}

#[test]
fn test_apply_all_threads_state() {
    let items = vec![
        Ast::map(Ast::entity("A"), "x", Ast::ident("x")),
        Ast::map(Ast::entity("B"), "y", Ast::ident("y")),
    ];
    let (out, log) = BinderLog::default().apply_all(items.clone());
    assert_eq!(out, items);
    assert_eq!(log.0, vec!["x", "y"]);
}

#[test]
fn test_fusion_style_substitution() {
    // e[d := c] for query[Person].map(p => p.name).map(d => d + "!")
    let e = Ast::ident("d").concat(Ast::constant("!"));
    let c = Ast::ident("p").prop("name");
    let fused = Ast::map(
        Ast::entity("Person"),
        "p",
        e.substitute(&Ident::new("d"), c),
    );
    assert_eq!(fused.to_string(), "query[Person].map(p => p.name + \"!\")");
}

#[test]
fn test_substitution_into_join_predicate() {
    let on = Ast::ident("a").prop("id").equal(Ast::ident("b").prop("fk"));
    let renamed = on.substitute_all(
        &Substitution::new()
            .with(&Ident::new("a"), Ast::ident("a1"))
            .with(&Ident::new("b"), Ast::ident("b1")),
    );
    assert_eq!(renamed.to_string(), "a1.id == b1.fk");
    assert!(renamed.is_free("a1"));
    assert!(!renamed.is_free("a"));
}

#[test]
fn test_substitution_skips_infix_text() {
    let infix = Ast::infix(
        vec!["lower(".into(), ")".into()],
        vec![Ast::ident("p").prop("name")],
    );
    let out = infix.substitute(&Ident::new("p"), Ast::ident("q"));
    let Ast::Infix { parts, params, .. } = out else {
        panic!("expected infix");
    };
    assert_eq!(parts, vec!["lower(".to_string(), ")".to_string()]);
    assert_eq!(params, vec![Ast::ident("q").prop("name")]);
}

#[test]
fn test_free_idents_across_scopes() {
    let f = Ast::function(
        vec![Ident::new("x")],
        Ast::filter(
            Ast::entity("E"),
            "e",
            Ast::ident("e").prop("v").equal(Ast::ident("x")).and(Ast::ident("y")),
        ),
    );
    let free = f.free_idents();
    assert_eq!(free.len(), 1);
    assert!(free.contains("y"));

    let bound = f.bound_idents();
    assert!(bound.contains("x"));
    assert!(bound.contains("e"));
}

#[test]
fn test_temporary_ident_permanent_form() {
    let tmp = Ident::temporary(7, Quat::Value);
    assert!(tmp.is_temporary());
    assert_eq!(tmp.kind(), IdentKind::Temporary);

    let perm = tmp.permanent();
    assert_eq!(perm.name(), PERMANENT_BASE);
    assert!(!perm.is_temporary());
    assert_eq!(perm.quat(), &Quat::Value);
}

#[test]
fn test_naming_state_is_persistent() {
    let empty = NamingState::new();
    let one = empty.with(IdentName::new("a"));
    let two = one.with_all(["a1", "b"].map(IdentName::new));

    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);
    assert_eq!(two.len(), 3);
    assert_eq!(one.fresh(&Ident::new("a")).name(), "a1");
    assert_eq!(two.fresh(&Ident::new("a")).name(), "a2");
}

#[test]
fn test_validate_hygiene() {
    assert!(validate_hygiene(&people_join()).is_ok());

    let clash = Ast::join(
        JoinType::Inner,
        Ast::map(Ast::entity("Person"), "a", Ast::ident("a")),
        Ast::entity("Address"),
        "a",
        "b",
        Ast::ident("a").equal(Ast::ident("b")),
    );
    let violations = HygieneValidator::validate(&clash).unwrap_err();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].node, "Map");
    assert!(validate_hygiene(&clash).is_err());
}

#[test]
fn test_explain_join() {
    let explain = people_join().explain();
    assert!(explain.starts_with("Join (Inner, (a, b) => a.id == b.owner)\n"));
    assert!(explain.contains("├─ Map (p => p)"));
    assert!(explain.contains("└─ Filter (d => d.valid)"));
}
