//! Property-based tests over the testable properties from spec §8: P1
//! (notation round-trip), P3 (matcher determinism), P5 (confluence across
//! insertion order), P6 (degree consistency), P7 (insert idempotence), and
//! P8 (sequence-wildcard neutrality to trailing arguments).

use hypergraph_ast::{AtomBuilder, EdgeBuilder, Hyperedge, RoleCode, TypeCode};
use proptest::prelude::*;
use semhg::kb::Kb;
use semhg::pattern::{match_pattern, Pattern};
use semhg::{notation, rules::RuleEngine};

/// An arbitrary lowercase label, disjoint from role/type suffix syntax.
fn label_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,8}".prop_map(|s| s)
}

/// A single atom: a random label on one of the five atomic type codes.
fn atom_strategy() -> impl Strategy<Value = Hyperedge> {
    (
        label_strategy(),
        prop_oneof![
            Just(TypeCode::C),
            Just(TypeCode::M),
            Just(TypeCode::B),
            Just(TypeCode::T),
            Just(TypeCode::J),
        ],
    )
        .prop_map(|(label, type_code)| Hyperedge::atom(AtomBuilder::new(label, type_code).build()))
}

/// A small `(P subject object)`-shaped composite, bounded to keep the
/// strategy terminating and within invariant I4's arity cap.
fn relation_strategy() -> impl Strategy<Value = Hyperedge> {
    (label_strategy(), atom_strategy(), atom_strategy()).prop_map(|(pred, subj, obj)| {
        let connector = AtomBuilder::new(pred, TypeCode::P).build();
        let subject = match subj {
            Hyperedge::Atom(a) => Hyperedge::atom(
                a.with_role(RoleCode::Subject, TypeCode::P)
                    .expect("subject role is always allowed under a predicate connector"),
            ),
            other => other,
        };
        EdgeBuilder::new(connector)
            .arg(subject)
            .arg(obj)
            .build()
            .expect("predicate with two arguments is always a valid edge")
    })
}

proptest! {
    /// P1: printing then re-parsing any generated hyperedge reproduces it
    /// exactly.
    #[test]
    fn p1_notation_round_trips(edge in relation_strategy()) {
        let printed = notation::print(&edge);
        let reparsed = notation::parse(&printed).expect("printer output is always parseable");
        prop_assert_eq!(notation::print(&reparsed), printed);
    }

    /// P3: matching the same pattern against the same edge twice yields
    /// identical bindings (the matcher carries no hidden mutable state).
    #[test]
    fn p3_matcher_is_deterministic(edge in relation_strategy()) {
        let pattern = Pattern::parse("($PRED/P $SUB:s $OBJ)").unwrap();
        let first = match_pattern(&pattern, &edge);
        let second = match_pattern(&pattern, &edge);
        prop_assert_eq!(first, second);
    }

    /// P6: once an argument of a composite is itself inserted into the KB,
    /// its degree picks up exactly that composite's argument count. Degree
    /// measures participation in containing edges, not the edge's own arity.
    #[test]
    fn p6_degree_counts_containing_edges(edge in relation_strategy()) {
        let kb = Kb::new();
        let subject = edge.arguments()[0].clone();
        let subject_id = kb.insert(subject);
        let arity = edge.arguments().len();
        kb.insert(edge);
        prop_assert_eq!(kb.degree(subject_id), arity);
    }

    /// P7: inserting the same (structurally equal) edge twice returns the
    /// same id and leaves the KB with one edge, not two.
    #[test]
    fn p7_insert_is_idempotent(edge in relation_strategy()) {
        let kb = Kb::new();
        let first = kb.insert(edge.clone());
        let second = kb.insert(edge);
        prop_assert_eq!(first, second);
        prop_assert_eq!(kb.len(), 1);
    }

    /// P8: a trailing `...` in a pattern matches regardless of how many
    /// extra trailing atoms the target edge carries beyond the pattern's
    /// fixed prefix.
    #[test]
    fn p8_sequence_wildcard_is_neutral_to_trailing_arity(
        extra in prop::collection::vec(atom_strategy(), 0..4),
    ) {
        let connector = AtomBuilder::new("rel", TypeCode::P).build();
        let subject = Hyperedge::atom(
            AtomBuilder::new("actor", TypeCode::C).role(RoleCode::Subject).build(),
        );
        let mut builder = EdgeBuilder::new(connector).arg(subject);
        for e in extra {
            builder = builder.arg(e);
        }
        let edge = builder.build().expect("bounded arity stays under the cap");

        let pattern = Pattern::parse("($PRED/P $SUB:s ...)").unwrap();
        let bindings = match_pattern(&pattern, &edge);
        prop_assert_eq!(bindings.len(), 1);
    }
}

/// P4: the built-in rule set always reaches a fixed point within the
/// default iteration cap, even on a KB seeded with several independent
/// conjunctions to decompose.
#[test]
fn p4_builtin_rules_terminate_on_multiple_conjunctions() {
    let kb = Kb::new();
    for (pred, a, b) in [("likes", "bananas", "apples"), ("wants", "tea", "coffee")] {
        kb.insert(
            notation::parse(&format!(
                "({pred}/P alice/C.s (and/J {a}/C {b}/C))"
            ))
            .unwrap(),
        );
    }
    let mut engine = RuleEngine::with_builtins();
    let report = engine
        .run(&kb, &semhg::execution::ResourceLimits::default(), None)
        .expect("built-in rules are checked terminating at load time");
    assert!(report.iterations <= semhg::config::EngineConfig::default().max_rule_iterations);
}

/// P5: running the same conjunction-decomposition rule set over KBs seeded
/// in two different insertion orders produces the same set of resulting
/// edges (confluence doesn't depend on arrival order).
#[test]
fn p5_confluence_is_insertion_order_independent() {
    let sentences = [
        "(likes/P alice/C.s (and/J bananas/C apples/C))",
        "(wants/P alice/C.s (and/J tea/C coffee/C))",
    ];

    let forward = Kb::new();
    for s in sentences {
        forward.insert(notation::parse(s).unwrap());
    }
    let backward = Kb::new();
    for s in sentences.iter().rev() {
        backward.insert(notation::parse(s).unwrap());
    }

    for kb in [&forward, &backward] {
        let mut engine = RuleEngine::with_builtins();
        engine
            .run(kb, &semhg::execution::ResourceLimits::default(), None)
            .unwrap();
    }

    let mut forward_edges: Vec<String> = forward
        .iter(None)
        .into_iter()
        .map(|(_, h)| notation::print(&h))
        .collect();
    let mut backward_edges: Vec<String> = backward
        .iter(None)
        .into_iter()
        .map(|(_, h)| notation::print(&h))
        .collect();
    forward_edges.sort();
    backward_edges.sort();
    assert_eq!(forward_edges, backward_edges);
}
