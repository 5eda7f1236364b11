//! Integration tests for quarry-optimizer
//!
//! Scenario tests for the resolver and fusion entry points, plus property
//! tests over random query trees.

use std::collections::HashSet;

use common_config::NormalizerConfig;
use proptest::prelude::*;
use quarry_ast::validation::validate_hygiene;
use quarry_ast::*;
use quarry_optimizer::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_dedupe_determinism() {
    let state: NamingState = ["a", "a1"].into_iter().map(IdentName::new).collect();
    assert_eq!(state.fresh(&Ident::new("a")).name(), "a2");
    assert_eq!(state.fresh(&Ident::new("a")).name(), "a2");
}

#[test]
fn test_fast_path_leaves_outer_binder() {
    init_logger();
    let q = Ast::flat_map(
        Ast::entity("A"),
        "a",
        Ast::filter(
            Ast::entity("E"),
            "a",
            Ast::ident("a").prop("id").equal(Ast::ident("a").prop("fk")),
        ),
    );
    let out = resolve_hygiene(q, false);
    assert_eq!(
        out.to_string(),
        "query[A].flatMap(a => query[E].filter(a1 => a1.id == a1.fk))"
    );
    assert!(validate_hygiene(&out).is_ok());
}

#[test]
fn test_map_map_fusion_scenario() {
    let q = Ast::map(
        Ast::map(Ast::entity("Person"), "p", Ast::ident("p").prop("name")),
        "p2",
        Ast::ident("p2").concat(Ast::constant("!")),
    );
    let fused = simplify(&q).unwrap();
    assert_eq!(
        fused,
        Ast::map(
            Ast::entity("Person"),
            "p",
            Ast::ident("p").prop("name").concat(Ast::constant("!")),
        )
    );
    assert_eq!(fused.query_count(), q.query_count() - 1);
}

#[test]
fn test_filter_fusion_scenario() {
    let q = Ast::filter(
        Ast::map(Ast::entity("Person"), "p", Ast::ident("p").prop("name")),
        "n",
        Ast::ident("n").equal(Ast::constant("Bob")),
    );
    assert_eq!(
        simplify(&q).unwrap().to_string(),
        "query[Person].filter(p => p.name == \"Bob\").map(p => p.name)"
    );
}

#[test]
fn test_join_dual_renaming_scenario() {
    let q = Ast::join(
        JoinType::Inner,
        Ast::entity("A"),
        Ast::entity("B"),
        "a",
        "b",
        Ast::ident("a").prop("id").equal(Ast::ident("b").prop("fk")),
    );
    let state = NamingState::seeded([IdentName::new("a")]);
    let (out, _) = AliasResolver::with_state(state, false).resolve(q);
    assert_eq!(
        out.to_string(),
        "query[A].join(query[B]).on((a1, b) => a1.id == b.fk)"
    );
}

#[test]
fn test_join_as_source_scenario() {
    init_logger();
    let join = Ast::join(
        JoinType::Inner,
        Ast::entity("B"),
        Ast::entity("C"),
        "a",
        "c",
        Ast::ident("a").prop("id").equal(Ast::ident("c").prop("id")),
    );
    let q = Ast::flat_map(
        Ast::entity("A"),
        "a",
        Ast::map(join, "x", Ast::ident("x").prop("v")),
    );

    let out = normalize(q).unwrap();
    assert!(validate_hygiene(&out).is_ok());

    let Ast::FlatMap { body, .. } = &out else {
        panic!("expected flatMap, got {out}");
    };
    let Ast::Map { query, alias, .. } = body.as_ref() else {
        panic!("expected map, got {body}");
    };
    assert_eq!(alias.name(), "x");
    assert_eq!(
        query.to_string(),
        "query[B].join(query[C]).on((a1, c) => a1.id == c.id)"
    );
}

#[test]
fn test_temporary_permanentized_once() {
    let tmp = Ident::temporary(9, Quat::Value);
    let q = Ast::map(Ast::entity("A"), tmp.clone(), Ast::Ident(tmp));
    let taken = NamingState::seeded([IdentName::new("x")]);

    let (first, _) = AliasResolver::with_state(taken.clone(), true).resolve(q.clone());
    assert_eq!(first.to_string(), "query[A].map(x1 => x1)");

    let (again, _) = AliasResolver::with_state(taken, false).resolve(first.clone());
    assert_eq!(again, first);

    let untouched = resolve_hygiene(q.clone(), false);
    assert_eq!(untouched, q);
}

#[test]
fn test_sanitize_entry_points() {
    let dangerous: HashSet<IdentName> = ["p"].into_iter().map(IdentName::new).collect();

    let f = Ast::function(vec![Ident::new("p")], Ast::ident("p").prop("id"));
    assert_eq!(
        sanitize_function(f, &dangerous).unwrap().to_string(),
        "(p1) => p1.id"
    );

    let action = Ast::foreach(Ast::entity("Person"), "p", Ast::ident("p").prop("id"));
    assert_eq!(
        sanitize_foreach(action, &dangerous).unwrap().to_string(),
        "query[Person].foreach(p1 => p1.id)"
    );

    assert!(sanitize_foreach(Ast::entity("Person"), &dangerous).is_err());
}

#[test]
fn test_normalizer_with_custom_optimizer() {
    init_logger();
    let config = NormalizerConfig::default().with_trace(true);
    let optimizer = Optimizer::with_config(vec![Box::new(IntermediateMapFusion)], config);
    let normalizer = Normalizer::with_optimizer(optimizer);

    let q = Ast::sort_by(
        Ast::map(Ast::entity("Person"), "p", Ast::ident("p").prop("age")),
        "a",
        Ast::ident("a"),
        Ordering::Desc,
    );
    let result = normalizer.normalize_traced(q).unwrap();
    assert_eq!(
        result.ast.to_string(),
        "query[Person].sortBy(p => p.age)(Ord.desc).map(p1 => p1.age)"
    );
    assert!(result.format_trace().contains("IntermediateMapFusion"));
}

#[test]
fn test_normalize_keeps_group_by_boundary() {
    let q = Ast::map(
        Ast::map(
            Ast::group_by(Ast::entity("Person"), "p", Ast::ident("p").prop("age")),
            "g",
            Ast::ident("g").prop("_1"),
        ),
        "k",
        Ast::ident("k"),
    );
    let out = normalize(q.clone()).unwrap();
    assert_eq!(out, q);
}

// =========================================================================
// Strategies
// =========================================================================

fn arb_binder() -> impl Strategy<Value = Ident> {
    prop_oneof![
        4 => prop::sample::select(vec!["a", "b", "x", "x1", "p"]).prop_map(Ident::new),
        1 => (1u64..3).prop_map(|t| Ident::temporary(t, Quat::Unknown)),
    ]
}

/// Scalar expressions without subqueries.
fn arb_scalar() -> impl Strategy<Value = Ast> {
    let leaf = prop_oneof![
        arb_binder().prop_map(Ast::Ident),
        (0i64..10).prop_map(Ast::constant),
    ];
    leaf.prop_recursive(2, 8, 2, |inner| {
        prop_oneof![
            (inner.clone(), "[a-z]{1,3}").prop_map(|(a, p)| a.prop(p)),
            (inner.clone(), inner).prop_map(|(a, b)| a.equal(b)),
        ]
    })
}

fn arb_source_leaf() -> impl Strategy<Value = Ast> {
    prop_oneof![
        "[A-D]".prop_map(Ast::entity),
        "[A-D]".prop_map(|e| Ast::take(Ast::entity(e), Ast::constant(5i64))),
    ]
}

/// Query trees. Joins appear both bare and nested, so binder nodes see
/// joins directly in source position.
fn arb_query() -> impl Strategy<Value = Ast> {
    arb_source_leaf().prop_recursive(4, 32, 2, |inner| {
        let body = prop_oneof![
            3 => arb_scalar(),
            1 => inner.clone(),
            1 => (arb_scalar(), inner.clone())
                .prop_map(|(s, q)| Ast::Tuple(vec![s, Ast::aggregation(AggregationOperator::Size, q)])),
        ];
        prop_oneof![
            (inner.clone(), arb_binder(), body.clone()).prop_map(|(q, a, b)| Ast::map(q, a, b)),
            (inner.clone(), arb_binder(), body.clone())
                .prop_map(|(q, a, b)| Ast::flat_map(q, a, b)),
            (inner.clone(), arb_binder(), body.clone()).prop_map(|(q, a, b)| Ast::filter(q, a, b)),
            (inner.clone(), arb_binder(), arb_scalar())
                .prop_map(|(q, a, b)| Ast::sort_by(q, a, b, Ordering::Asc)),
            (inner.clone(), arb_binder(), arb_scalar())
                .prop_map(|(q, a, b)| Ast::group_by(q, a, b)),
            (
                inner.clone(),
                inner.clone(),
                arb_binder(),
                arb_binder(),
                arb_scalar()
            )
                .prop_map(|(a, b, x, y, on)| {
                    Ast::nested(Ast::join(JoinType::Inner, a, b, x, y, on))
                }),
            (
                inner.clone(),
                inner.clone(),
                arb_binder(),
                arb_binder(),
                arb_scalar()
            )
                .prop_map(|(a, b, x, y, on)| Ast::join(JoinType::Left, a, b, x, y, on)),
            (inner.clone(), arb_binder(), arb_scalar())
                .prop_map(|(q, a, on)| Ast::flat_join(JoinType::Left, q, a, on)),
            (inner.clone(), inner).prop_map(|(a, b)| Ast::union_all(a, b)),
        ]
    })
}

fn has_temporary(ast: &Ast) -> bool {
    ast.contains(|node| {
        node.own_binders().iter().any(|b| b.is_temporary())
            || matches!(node, Ast::Ident(ident) if ident.is_temporary())
    })
}

// =========================================================================
// Property Tests
// =========================================================================

proptest! {
    /// Every root-to-leaf path of a resolved tree binds each name once.
    #[test]
    fn resolved_trees_are_hygienic(q in arb_query(), permanentize in any::<bool>()) {
        let out = resolve_hygiene(q, permanentize);
        prop_assert!(validate_hygiene(&out).is_ok(), "not hygienic: {}", out);
    }

    /// A second resolver run renames nothing.
    #[test]
    fn resolution_is_idempotent(q in arb_query(), permanentize in any::<bool>()) {
        let once = resolve_hygiene(q, permanentize);
        let twice = resolve_hygiene(once.clone(), permanentize);
        prop_assert_eq!(twice, once);
    }

    /// Resolution only renames: the shape of the tree is unchanged.
    #[test]
    fn resolution_preserves_shape(q in arb_query()) {
        let out = resolve_hygiene(q.clone(), true);
        prop_assert_eq!(out.node_count(), q.node_count());
        prop_assert_eq!(out.query_count(), q.query_count());
    }

    /// Permanentization leaves no temporary binder behind.
    #[test]
    fn permanentization_removes_bound_temporaries(q in arb_query()) {
        let out = resolve_hygiene(q.clone(), true);
        let free_temporaries = q
            .free_idents()
            .iter()
            .any(|n| n.as_str().starts_with('@'));
        if !free_temporaries {
            prop_assert!(!has_temporary(&out), "temporary left in {}", out);
        }
    }

    /// Map-map and map-flatMap fusion remove exactly one query node.
    #[test]
    fn map_fusion_removes_one_query(
        source in arb_query(),
        b in arb_binder(),
        c in arb_scalar(),
        d in arb_binder(),
        e in arb_query(),
        flat in any::<bool>()
    ) {
        prop_assume!(!matches!(source, Ast::GroupBy { .. }));
        let inner = Ast::map(source, b, c);
        let q = if flat {
            Ast::flat_map(inner, d, e)
        } else {
            Ast::map(inner, d, e)
        };
        let fused = simplify(&q).expect("map over map fuses");
        prop_assert_eq!(fused.query_count() + 1, q.query_count());
    }

    /// Filter and sortBy fusion move the map outward without losing nodes.
    #[test]
    fn map_reordering_keeps_query_count(
        source in arb_query(),
        b in arb_binder(),
        c in arb_scalar(),
        d in arb_binder(),
        e in arb_scalar(),
        sort in any::<bool>()
    ) {
        prop_assume!(!matches!(source, Ast::GroupBy { .. }));
        let inner = Ast::map(source, b, c);
        let q = if sort {
            Ast::sort_by(inner, d, e, Ordering::Desc)
        } else {
            Ast::filter(inner, d, e)
        };
        let fused = simplify(&q).expect("filter or sortBy over map fuses");
        prop_assert!(matches!(fused, Ast::Map { .. }), "expected fused Map");
        prop_assert_eq!(fused.query_count(), q.query_count());
    }

    /// Nothing fuses through a map over a groupBy.
    #[test]
    fn group_by_map_never_fuses(
        source in arb_query(),
        g in arb_binder(),
        key in arb_scalar(),
        d in arb_binder(),
        e in arb_scalar()
    ) {
        let grouped = Ast::map(Ast::group_by(source, g.clone(), key), g, Ast::Ident(d.clone()));
        for q in [
            Ast::map(grouped.clone(), d.clone(), e.clone()),
            Ast::flat_map(grouped.clone(), d.clone(), e.clone()),
            Ast::filter(grouped.clone(), d.clone(), e.clone()),
            Ast::sort_by(grouped, d, e, Ordering::Asc),
        ] {
            prop_assert_eq!(simplify(&q), None);
        }
    }

    /// The full pipeline ends in a stable, hygienic tree.
    #[test]
    fn normalization_is_stable(q in arb_query()) {
        let once = normalize(q).unwrap();
        prop_assert!(validate_hygiene(&once).is_ok());
        let twice = normalize(once.clone()).unwrap();
        prop_assert_eq!(twice, once);
    }
}
