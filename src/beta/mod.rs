//! β-Parser (C5): bottom-up, dependency-tree-guided assembly of a typed
//! atom sequence into one well-formed hyperedge (spec §4.5).
//!
//! The dependency tree is consulted as an *advisory* structural hint — it
//! drives traversal order ([`tree::DependencyTree::post_order`]) and the
//! [`heuristic`] scorer — but [`hypergraph_ast::infer`] is the sole arbiter
//! of whether a candidate grouping is legal, exactly as spec §9 describes.

pub mod heuristic;
pub mod role_map;
mod tree;

pub use tree::DependencyTree;

use crate::alpha::TypedAtom;
use crate::dependency::Token;
use heuristic::{HeuristicScore, RuleRank};
use hypergraph_ast::{Atom, Hyperedge, TypeCode};
use std::collections::HashMap;

/// A recoverable sentence-assembly failure: the stack held more than one
/// hyperedge (or a node's dependents could not be grouped by any rule) when
/// assembly finished (spec §4.5 `BetaError`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not assemble a single hyperedge: unconsumed token indices {unconsumed:?}")]
pub struct BetaError {
    pub unconsumed: Vec<u32>,
}

/// The result of successfully assembling one sentence: the root hyperedge
/// plus any non-fatal warnings raised along the way (e.g. a dangling
/// preposition, spec §4.5 edge-case policy).
#[derive(Debug, Clone)]
pub struct AssembleOutput {
    pub hyperedge: Hyperedge,
    pub warnings: Vec<String>,
}

/// Assemble one sentence's typed atoms into a single hyperedge, guided by
/// the dependency relations carried on `tokens` (spec §4.5 algorithm
/// points 1–6). `tokens` may include DISCARD-ed tokens (e.g. punctuation);
/// only those with a corresponding entry in `typed_atoms` participate.
pub fn assemble(tokens: &[Token], typed_atoms: &[TypedAtom]) -> Result<AssembleOutput, BetaError> {
    let atom_by_index: HashMap<u32, Atom> = typed_atoms
        .iter()
        .map(|t| (t.token_index, t.atom.clone()))
        .collect();
    let kept_tokens: Vec<Token> = tokens
        .iter()
        .filter(|t| atom_by_index.contains_key(&t.index))
        .cloned()
        .collect();
    let tree = DependencyTree::build(&kept_tokens);

    let mut warnings = Vec::new();
    let mut built: HashMap<u32, Hyperedge> = HashMap::new();
    let mut unconsumed: Vec<u32> = Vec::new();

    for index in tree.post_order() {
        let own_atom = atom_by_index
            .get(&index)
            .expect("post_order only visits tokens with a typed atom")
            .clone();
        let child_indices = tree.children_of(index).to_vec();
        let mut remaining: Vec<(u32, String, Hyperedge)> = child_indices
            .iter()
            .map(|&c| {
                let dep = tree.token(c).map(|t| t.dep.clone()).unwrap_or_default();
                let built_child = built
                    .remove(&c)
                    .expect("post-order guarantees a child is built before its parent");
                (c, dep, built_child)
            })
            .collect();

        let mut own = Hyperedge::atom(own_atom.clone());

        // (1) Conjunction coordination: UD attaches subsequent conjuncts
        // and the coordinator to the *first* conjunct, so this node (not
        // its head) does the J-grouping before it is consumed upward.
        if let Some(j_edge) = group_conjunction(&tree, index, &own, &mut remaining) {
            own = j_edge;
        }

        // (2) Implicit compound-noun builder (+/B): fold in every
        // `compound`-related C sibling, best (closest) first.
        own = group_builder(&tree, index, own, &mut remaining);

        // (3) Modifier wrapping (M): adjectival/adverbial dependents wrap
        // whatever `own` currently is.
        own = group_modifier(&tree, index, own, &mut remaining);

        // (4) Trigger wrapping (T): a trigger atom consumes its own
        // (single) dependent to form a specifier.
        if own_atom.type_code == TypeCode::T {
            own = group_trigger(own, &mut remaining, &mut warnings, index);
        }

        // (5) Predicate argument collection (P): every remaining
        // dependent becomes a role-annotated argument.
        if own_atom.type_code == TypeCode::P {
            own = group_predicate(own, remaining.drain(..).collect());
        }

        if !remaining.is_empty() {
            unconsumed.extend(remaining.iter().map(|(idx, _, _)| *idx));
        }
        built.insert(index, own);
    }

    if !unconsumed.is_empty() {
        unconsumed.sort_unstable();
        return Err(BetaError { unconsumed });
    }

    let roots = tree.roots();
    let mut root_edges: Vec<Hyperedge> = roots
        .iter()
        .filter_map(|r| built.remove(r))
        .collect();
    if root_edges.len() != 1 {
        return Err(BetaError {
            unconsumed: roots,
        });
    }
    Ok(AssembleOutput {
        hyperedge: root_edges.remove(0),
        warnings,
    })
}

fn group_conjunction(
    tree: &DependencyTree,
    index: u32,
    own: &Hyperedge,
    remaining: &mut Vec<(u32, String, Hyperedge)>,
) -> Option<Hyperedge> {
    let cc_pos = remaining.iter().position(|(_, dep, _)| dep == "cc")?;
    let conj_indices: Vec<usize> = remaining
        .iter()
        .enumerate()
        .filter(|(_, (_, dep, _))| dep == "conj")
        .map(|(i, _)| i)
        .collect();
    if conj_indices.is_empty() {
        return None;
    }

    let mut scored: Vec<(HeuristicScore, usize)> = conj_indices
        .iter()
        .map(|&i| {
            let (child_idx, _, _) = &remaining[i];
            let distance = tree.distance(index, *child_idx).unwrap_or(u32::MAX);
            let depth = tree.depth(*child_idx).unwrap_or(0);
            (HeuristicScore::new(distance, depth, RuleRank::J, 0), i)
        })
        .collect();
    scored.sort_by_key(|(score, _)| *score);

    let (_, _, cc_hyperedge) = remaining[cc_pos].clone();
    let mut elements = vec![cc_hyperedge, own.clone()];
    for (_, i) in &scored {
        elements.push(remaining[*i].2.clone());
    }
    let edge = Hyperedge::new_edge(elements).ok()?;

    let mut consumed: Vec<usize> = conj_indices;
    consumed.push(cc_pos);
    consumed.sort_unstable();
    for i in consumed.into_iter().rev() {
        remaining.remove(i);
    }
    Some(edge)
}

fn group_builder(
    tree: &DependencyTree,
    index: u32,
    mut own: Hyperedge,
    remaining: &mut Vec<(u32, String, Hyperedge)>,
) -> Hyperedge {
    loop {
        if own.type_code() != TypeCode::C {
            break;
        }
        let candidates: Vec<(HeuristicScore, usize)> = remaining
            .iter()
            .enumerate()
            .filter(|(_, (_, dep, h))| {
                (dep == "compound" || dep == "nmod" || dep == "poss") && h.type_code() == TypeCode::C
            })
            .map(|(i, (child_idx, _, _))| {
                let distance = tree.distance(index, *child_idx).unwrap_or(u32::MAX);
                let depth = tree.depth(*child_idx).unwrap_or(0);
                (HeuristicScore::new(distance, depth, RuleRank::B, 0), i)
            })
            .collect();
        let Some(best_idx) = heuristic::best(candidates) else {
            break;
        };
        let (_, _, child_edge) = remaining.remove(best_idx);
        let implicit_builder = Hyperedge::atom(Atom::new("+", TypeCode::B));
        match Hyperedge::new_edge(vec![implicit_builder, own.clone(), child_edge]) {
            Ok(edge) => own = edge,
            Err(_) => break,
        }
    }
    own
}

fn group_modifier(
    tree: &DependencyTree,
    index: u32,
    mut own: Hyperedge,
    remaining: &mut Vec<(u32, String, Hyperedge)>,
) -> Hyperedge {
    loop {
        let candidates: Vec<(HeuristicScore, usize)> = remaining
            .iter()
            .enumerate()
            .filter(|(_, (_, dep, h))| {
                matches!(dep.as_str(), "amod" | "advmod") && h.type_code() == TypeCode::M
            })
            .map(|(i, (child_idx, _, _))| {
                let distance = tree.distance(index, *child_idx).unwrap_or(u32::MAX);
                let depth = tree.depth(*child_idx).unwrap_or(0);
                (HeuristicScore::new(distance, depth, RuleRank::M, 0), i)
            })
            .collect();
        let Some(best_idx) = heuristic::best(candidates) else {
            break;
        };
        let (_, _, modifier_edge) = remaining.remove(best_idx);
        match Hyperedge::new_edge(vec![modifier_edge, own.clone()]) {
            Ok(edge) => own = edge,
            Err(_) => break,
        }
    }
    own
}

fn group_trigger(
    own: Hyperedge,
    remaining: &mut Vec<(u32, String, Hyperedge)>,
    warnings: &mut Vec<String>,
    index: u32,
) -> Hyperedge {
    if remaining.is_empty() {
        warnings.push(format!(
            "token {index}: dangling preposition with no object, inserting placeholder"
        ));
        let placeholder = Hyperedge::atom(Atom::new("_", TypeCode::C));
        return Hyperedge::new_edge(vec![own, placeholder])
            .expect("(T C) always satisfies IR-T");
    }
    let (_, _, object) = remaining.remove(0);
    match Hyperedge::new_edge(vec![own.clone(), object.clone()]) {
        Ok(edge) => edge,
        Err(_) => {
            // The object wasn't C/R-typed (e.g. itself a dangling T); put it
            // back unconsumed rather than silently dropping it.
            remaining.insert(0, (index, "pobj".to_string(), object));
            own
        }
    }
}

fn group_predicate(own: Hyperedge, children: Vec<(u32, String, Hyperedge)>) -> Hyperedge {
    let Hyperedge::Atom(predicate_atom) = &own else {
        return own;
    };
    let mut elements = vec![own.clone()];
    for (_, dep, child) in children {
        let annotated = match (&child, role_map::role_for_dep(&dep)) {
            (Hyperedge::Atom(atom), Some(role)) => atom
                .clone()
                .with_role(role, TypeCode::P)
                .map(Hyperedge::atom)
                .unwrap_or(child),
            _ => child,
        };
        elements.push(annotated);
    }
    let _ = predicate_atom;
    Hyperedge::new_edge(elements).unwrap_or(own)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha::{classify_tokens, TableClassifier};
    use crate::notation;

    fn token(index: u32, surface: &str, pos: &str, dep: &str, head_index: u32) -> Token {
        Token {
            surface: surface.into(),
            pos: pos.into(),
            dep: dep.into(),
            head_pos: "X".into(),
            head_dep: "X".into(),
            pos_after: "X".into(),
            index,
            head_index,
        }
    }

    fn run(tokens: &[Token]) -> Hyperedge {
        let (atoms, errors) = classify_tokens(tokens, &TableClassifier::new());
        assert!(errors.is_empty(), "unexpected discards: {errors:?}");
        assemble(tokens, &atoms).unwrap().hyperedge
    }

    #[test]
    fn scenario_a_simple_transitive_sentence() {
        let tokens = vec![
            token(0, "Alice", "PROPN", "nsubj", 1),
            token(1, "likes", "VERB", "ROOT", 1),
            token(2, "bananas", "NOUN", "dobj", 1),
        ];
        let h = run(&tokens);
        assert_eq!(notation::print(&h), "(likes/P alice/C.s bananas/C.o)");
    }

    #[test]
    fn scenario_b_conjunction_expansion_preserves_j_edge() {
        let tokens = vec![
            token(0, "Alice", "PROPN", "nsubj", 1),
            token(1, "likes", "VERB", "ROOT", 1),
            token(2, "bananas", "NOUN", "dobj", 1),
            token(3, "and", "CCONJ", "cc", 2),
            token(4, "apples", "NOUN", "conj", 2),
        ];
        let h = run(&tokens);
        assert_eq!(
            notation::print(&h),
            "(likes/P alice/C.s (and/J bananas/C apples/C))"
        );
    }

    #[test]
    fn scenario_c_compound_noun_builder() {
        let tokens = vec![
            token(0, "Berlin", "PROPN", "nsubj", 1),
            token(1, "is", "VERB", "ROOT", 1),
            token(2, "capital", "NOUN", "attr", 1),
            token(3, "Germany", "PROPN", "compound", 2),
        ];
        let h = run(&tokens);
        assert_eq!(
            notation::print(&h),
            "(is/P berlin/C.s (+/B capital/C germany/C))"
        );
    }

    #[test]
    fn scenario_d_trigger_and_specifier() {
        let tokens = vec![
            token(0, "Alice", "PROPN", "nsubj", 1),
            token(1, "arrived", "VERB", "ROOT", 1),
            token(2, "in", "ADP", "prep", 1),
            token(3, "2019", "NUM", "pobj", 2),
        ];
        let h = run(&tokens);
        assert_eq!(h.type_code(), TypeCode::R);
        assert_eq!(
            notation::print(&h),
            "(arrived/P alice/C.s (in/T 2019/C))"
        );
    }

    #[test]
    fn dangling_preposition_inserts_placeholder_with_warning() {
        let tokens = vec![
            token(0, "Alice", "PROPN", "nsubj", 1),
            token(1, "left", "VERB", "ROOT", 1),
            token(2, "in", "ADP", "prep", 1),
        ];
        let (atoms, _) = classify_tokens(&tokens, &TableClassifier::new());
        let output = assemble(&tokens, &atoms).unwrap();
        assert!(!output.warnings.is_empty());
        assert!(output.hyperedge.contains(&notation::parse("_/C").unwrap()));
    }

    #[test]
    fn disconnected_fragments_are_a_beta_error() {
        let tokens = vec![
            token(0, "Alice", "PROPN", "ROOT", 0),
            token(1, "Bob", "PROPN", "ROOT", 1),
        ];
        let (atoms, _) = classify_tokens(&tokens, &TableClassifier::new());
        let err = assemble(&tokens, &atoms).unwrap_err();
        assert_eq!(err.unconsumed, vec![0, 1]);
    }
}
