//! The pattern matcher: recursive structural matching of a [`super::Pattern`]
//! against a [`Hyperedge`], producing every admissible variable [`Binding`]
//! (spec §4.6).
//!
//! Matching never fails at runtime — a malformed pattern is rejected earlier,
//! at [`super::Pattern::parse`] time. An unmatched pattern simply yields an
//! empty binding list. The natural recursion visits each
//! `(pattern-node, target-node)` pair exactly once except inside an
//! unordered-set span, whose permutation search is bounded by the ≤10
//! argument-arity invariant (spec I4) — so the documented `O(n·k)` bound
//! holds without an explicit cross-node memo table; [`crate::execution::cache::MatchCache`]
//! instead memoizes whole-pattern results *across* repeated calls on a KB.

use super::Pattern;
use hypergraph_ast::Hyperedge;
use std::collections::BTreeMap;

/// A single consistent assignment of pattern variables to sub-hyperedges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding(BTreeMap<String, Hyperedge>);

impl Binding {
    #[must_use]
    pub fn new() -> Self {
        Binding(BTreeMap::new())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Hyperedge> {
        self.0.get(name)
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Hyperedge)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn singleton(name: &str, value: Hyperedge) -> Self {
        let mut map = BTreeMap::new();
        map.insert(name.to_string(), value);
        Binding(map)
    }

    /// Merge two bindings, failing if they disagree (bind the same
    /// variable to structurally distinct hyperedges) — all bindings of the
    /// same variable must unify (spec §4.6).
    fn merge(&self, other: &Binding) -> Option<Binding> {
        let mut merged = self.0.clone();
        for (k, v) in &other.0 {
            match merged.get(k) {
                Some(existing) if existing != v => return None,
                _ => {
                    merged.insert(k.clone(), v.clone());
                }
            }
        }
        Some(Binding(merged))
    }
}

/// Match `pattern` against `target`, returning every admissible binding in
/// a deterministic order (spec P3): ties are broken by the canonical
/// notation of each binding's values, in the pattern's variable
/// pre-order — so identical inputs always yield the same ordered list.
#[must_use]
pub fn match_pattern(pattern: &Pattern, target: &Hyperedge) -> Vec<Binding> {
    let mut results = match_node(pattern, target);
    let order = pattern.variable_names();
    results.sort_by_key(|b| sort_key(b, &order));
    results.dedup();
    results
}

fn sort_key(binding: &Binding, order: &[&str]) -> String {
    order
        .iter()
        .map(|name| {
            binding
                .get(name)
                .map(crate::notation::print)
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\u{1}")
}

fn match_node(pattern: &Pattern, target: &Hyperedge) -> Vec<Binding> {
    match pattern {
        Pattern::Any { type_constraint } => {
            if type_constraint.is_none_or(|tc| tc == target.type_code()) {
                vec![Binding::new()]
            } else {
                vec![]
            }
        }
        Pattern::Atom { label, type_code, role_code } => match target {
            Hyperedge::Atom(atom) => {
                let label_ok = label.as_deref().is_none_or(|l| l == atom.label);
                let type_ok = type_code.is_none_or(|tc| tc == atom.type_code);
                let role_ok = role_code.is_none_or(|rc| atom.role_code == Some(rc));
                if label_ok && type_ok && role_ok {
                    vec![Binding::new()]
                } else {
                    vec![]
                }
            }
            Hyperedge::Edge { .. } => vec![],
        },
        Pattern::Variable { name, type_constraint, role_constraint } => {
            let type_ok = type_constraint.is_none_or(|tc| tc == target.type_code());
            let role_ok = match role_constraint {
                None => true,
                Some(rc) => matches!(target, Hyperedge::Atom(a) if a.role_code == Some(*rc)),
            };
            if type_ok && role_ok {
                vec![Binding::singleton(name, target.clone())]
            } else {
                vec![]
            }
        }
        Pattern::UnorderedSet(inner) => match target {
            Hyperedge::Edge { elements, .. } if elements.len() == inner.len() => {
                match_unordered(inner, elements)
            }
            _ => vec![],
        },
        Pattern::Edge { elements, sequence_wildcard_at } => {
            let Hyperedge::Edge { elements: target_elements, .. } = target else {
                return vec![];
            };
            match_edge(elements, *sequence_wildcard_at, target_elements)
        }
    }
}

/// Consumption length of a top-level edge-pattern element against target
/// siblings: an ordinary pattern consumes exactly one; the sequence
/// wildcard itself is handled separately by the caller.
fn fixed_consumption(element: &Pattern, sequence_wildcard_index: Option<usize>, index: usize) -> usize {
    if sequence_wildcard_index == Some(index) {
        0
    } else if let Pattern::UnorderedSet(inner) = element {
        inner.len()
    } else {
        1
    }
}

fn match_edge(
    elements: &[Pattern],
    sequence_wildcard_at: Option<usize>,
    target: &[Hyperedge],
) -> Vec<Binding> {
    let fixed_len: usize = elements
        .iter()
        .enumerate()
        .map(|(i, e)| fixed_consumption(e, sequence_wildcard_at, i))
        .sum();
    let wildcard_len = match sequence_wildcard_at {
        Some(_) if target.len() >= fixed_len => target.len() - fixed_len,
        Some(_) => return vec![],
        None if target.len() == fixed_len => 0,
        None => return vec![],
    };

    let mut cursor = 0usize;
    let mut per_position: Vec<Vec<Binding>> = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        if sequence_wildcard_at == Some(i) {
            cursor += wildcard_len;
            per_position.push(vec![Binding::new()]);
            continue;
        }
        match element {
            Pattern::UnorderedSet(inner) => {
                let span = &target[cursor..cursor + inner.len()];
                per_position.push(match_unordered(inner, span));
                cursor += inner.len();
            }
            other => {
                per_position.push(match_node(other, &target[cursor]));
                cursor += 1;
            }
        }
    }

    cartesian_merge(per_position)
}

/// Match `patterns` (a fixed-size, order-agnostic set) against `targets` of
/// the same length: every pattern must be assigned a distinct target index
/// it matches, trying every admissible assignment (spec: "role-indifferent"
/// unordered positions may admit several simultaneously valid assignments).
fn match_unordered(patterns: &[Pattern], targets: &[Hyperedge]) -> Vec<Binding> {
    fn go(
        patterns: &[Pattern],
        targets: &[Hyperedge],
        used: &mut Vec<bool>,
        acc: &Binding,
    ) -> Vec<Binding> {
        let Some((pattern, rest)) = patterns.split_first() else {
            return vec![acc.clone()];
        };
        let mut out = Vec::new();
        for (i, target) in targets.iter().enumerate() {
            if used[i] {
                continue;
            }
            used[i] = true;
            for candidate in match_node(pattern, target) {
                if let Some(merged) = acc.merge(&candidate) {
                    out.extend(go(rest, targets, used, &merged));
                }
            }
            used[i] = false;
        }
        out
    }
    let mut used = vec![false; targets.len()];
    go(patterns, targets, &mut used, &Binding::new())
}

fn cartesian_merge(groups: Vec<Vec<Binding>>) -> Vec<Binding> {
    let mut acc = vec![Binding::new()];
    for group in groups {
        let mut next = Vec::new();
        for existing in &acc {
            for candidate in &group {
                if let Some(merged) = existing.merge(candidate) {
                    next.push(merged);
                }
            }
        }
        acc = next;
        if acc.is_empty() {
            break;
        }
    }
    acc
}
