//! Built-in rules shipped with the core (spec §4.7): conjunction
//! decomposition and anaphora resolution, expressed as ordinary [`Rule`]
//! values rather than special-cased engine logic.
//!
//! Both rely on a [`Template::Dynamic`] consequent because their rewrite
//! iterates a matched conjunction's element span — something a purely
//! substitutive [`Template::Static`] pattern can't express — so both
//! declare [`Termination::Idempotent`], as [`super::check_termination`]
//! requires for any dynamic-templated rule.

use super::{Directive, Rule, Template, Termination};
use crate::pattern::matcher::Binding;
use crate::pattern::Pattern;
use hypergraph_ast::{Hyperedge, RoleCode, TypeCode};

/// The default third-person/first-person pronoun set anaphora resolution
/// rewrites. Callers needing a different set author their own rule with
/// [`Rule`]/[`Directive`]/[`Template`] directly rather than reconfiguring
/// this one — the built-ins are ordinary values, not privileged.
const PRONOUNS: &[&str] = &["she", "he", "it", "they", "i", "you", "we"];

/// The built-in rule set: three conjunction-decomposition variants (J in
/// object, subject, and specifier position) plus anaphora resolution.
#[must_use]
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        conjunction_decomposition_object(),
        conjunction_decomposition_subject(),
        conjunction_decomposition_specifier(),
        anaphora_resolution(),
    ]
}

fn is_conjunction(h: &Hyperedge) -> bool {
    matches!(h, Hyperedge::Edge { elements, .. }
        if matches!(elements.first(), Some(Hyperedge::Atom(a)) if a.type_code == TypeCode::J))
}

fn conjuncts(h: &Hyperedge) -> Vec<Hyperedge> {
    match h {
        Hyperedge::Edge { elements, .. } => elements[1..].to_vec(),
        Hyperedge::Atom(_) => vec![],
    }
}

fn conj_guard(binding: &Binding) -> bool {
    binding.get("CONJ").is_some_and(is_conjunction)
}

/// `(P/P $sub:s (J/J a b …)) ⟼ (P/P $sub:s a), (P/P $sub:s b), …` — J in
/// object position.
fn conjunction_decomposition_object() -> Rule {
    Rule {
        id: "conjunction-decomposition-object".to_string(),
        antecedent: Pattern::parse("($PRED/P $SUB:s $CONJ)").unwrap(),
        directives: vec![Directive::Emit(Template::Dynamic(|binding| {
            let (Some(pred), Some(sub), Some(conj)) =
                (binding.get("PRED"), binding.get("SUB"), binding.get("CONJ"))
            else {
                return vec![];
            };
            conjuncts(conj)
                .into_iter()
                .filter_map(|c| Hyperedge::new_edge(vec![pred.clone(), sub.clone(), c]).ok())
                .collect()
        }))],
        priority: 0,
        termination: Termination::Idempotent,
        guard: Some(conj_guard),
    }
}

/// `(P/P (J/J a b …) $obj:o) ⟼ (P/P a $obj:o), (P/P b $obj:o), …` — J in
/// subject position.
fn conjunction_decomposition_subject() -> Rule {
    Rule {
        id: "conjunction-decomposition-subject".to_string(),
        antecedent: Pattern::parse("($PRED/P $CONJ $OBJ:o)").unwrap(),
        directives: vec![Directive::Emit(Template::Dynamic(|binding| {
            let (Some(pred), Some(conj), Some(obj)) =
                (binding.get("PRED"), binding.get("CONJ"), binding.get("OBJ"))
            else {
                return vec![];
            };
            conjuncts(conj)
                .into_iter()
                .filter_map(|c| Hyperedge::new_edge(vec![pred.clone(), c, obj.clone()]).ok())
                .collect()
        }))],
        priority: 0,
        termination: Termination::Idempotent,
        guard: Some(conj_guard),
    }
}

/// `(P/P $sub:s $obj:o (J/J a b …)) ⟼ (P/P $sub:s $obj:o a), …` — J in a
/// trailing specifier position.
fn conjunction_decomposition_specifier() -> Rule {
    Rule {
        id: "conjunction-decomposition-specifier".to_string(),
        antecedent: Pattern::parse("($PRED/P $SUB:s $OBJ:o $CONJ)").unwrap(),
        directives: vec![Directive::Emit(Template::Dynamic(|binding| {
            let (Some(pred), Some(sub), Some(obj), Some(conj)) = (
                binding.get("PRED"),
                binding.get("SUB"),
                binding.get("OBJ"),
                binding.get("CONJ"),
            ) else {
                return vec![];
            };
            conjuncts(conj)
                .into_iter()
                .filter_map(|c| {
                    Hyperedge::new_edge(vec![pred.clone(), sub.clone(), obj.clone(), c]).ok()
                })
                .collect()
        }))],
        priority: 0,
        termination: Termination::Idempotent,
        guard: Some(conj_guard),
    }
}

fn is_pronoun_subject(h: &Hyperedge) -> bool {
    matches!(h, Hyperedge::Atom(a)
        if a.role_code == Some(RoleCode::Subject) && PRONOUNS.contains(&a.lemma_or_label()))
}

fn anaphora_guard(binding: &Binding) -> bool {
    let Some(inner) = binding.get("INNER") else {
        return false;
    };
    inner.arguments().first().is_some_and(|arg| is_pronoun_subject(arg))
}

/// When an inner relation's subject is a pronoun and the outer relation
/// assigns an actor `$A` as subject, rewrite the inner subject to `$A`
/// (spec §4.7 "Anaphora Resolution").
///
/// The replace target is the whole matched outer edge, not the nested
/// `$INNER` sub-edge: only top-level, separately-inserted hyperedges carry
/// their own [`crate::kb::EdgeId`], so `Directive::Replace`'s old template
/// must reconstruct the exact edge [`crate::pattern::match_pattern`] was
/// run against.
fn anaphora_resolution() -> Rule {
    let antecedent = Pattern::parse("($OUTER/P $A:s $INNER)").unwrap();
    Rule {
        id: "anaphora-resolution".to_string(),
        antecedent: antecedent.clone(),
        directives: vec![Directive::Replace(
            Template::Static(antecedent),
            Template::Dynamic(|binding| {
                let (Some(outer), Some(a), Some(inner)) =
                    (binding.get("OUTER"), binding.get("A"), binding.get("INNER"))
                else {
                    return vec![];
                };
                let Hyperedge::Edge { elements, .. } = inner else {
                    return vec![];
                };
                if elements.len() < 2 {
                    return vec![];
                }
                let mut rewritten_inner = elements.clone();
                rewritten_inner[1] = a.clone();
                let Ok(new_inner) = Hyperedge::new_edge(rewritten_inner) else {
                    return vec![];
                };
                Hyperedge::new_edge(vec![outer.clone(), a.clone(), new_inner])
                    .into_iter()
                    .collect()
            }),
        )],
        priority: 10,
        termination: Termination::Idempotent,
        guard: Some(anaphora_guard),
    }
}
