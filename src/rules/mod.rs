//! Rule Engine (C7): antecedent → consequent rewriting over a [`crate::kb::Kb`]
//! with a confluent, priority-ordered fixed-point strategy (spec §4.7).

pub mod builtin;
pub mod engine;
pub mod parser;

use crate::pattern::matcher::Binding;
use crate::pattern::Pattern;
use hypergraph_ast::Hyperedge;

pub use engine::{check_termination, RuleEngine, RuleRunReport};

/// A rewrite action fired once per admissible binding of a rule's
/// antecedent (spec §4.7 point 2).
pub enum Directive {
    /// Insert a hyperedge into the KB.
    Emit(Template),
    /// Replace an existing hyperedge, preserving its ID and rewiring
    /// containers (spec §4.7, `REPLACE h_old h_new`).
    Replace(Template, Template),
    /// Remove a hyperedge from the KB.
    Retract(Template),
}

impl Clone for Directive {
    fn clone(&self) -> Self {
        match self {
            Directive::Emit(t) => Directive::Emit(t.clone()),
            Directive::Replace(a, b) => Directive::Replace(a.clone(), b.clone()),
            Directive::Retract(t) => Directive::Retract(t.clone()),
        }
    }
}

/// A consequent template: either an ordinary pattern instantiated by
/// substituting bound variables (`Static`), or a built-in's procedural
/// expansion over the binding (`Dynamic`) — used where the consequent must
/// iterate a matched span (e.g. one relation per conjunct), which a purely
/// substitutive template cannot express.
///
/// A `Dynamic` template's rule must declare [`Termination::Idempotent`]
/// (checked at load time by [`check_termination`]), since its output can't
/// be verified to shrink structurally by static inspection alone.
pub enum Template {
    Static(Pattern),
    Dynamic(fn(&Binding) -> Vec<Hyperedge>),
}

impl Clone for Template {
    fn clone(&self) -> Self {
        match self {
            Template::Static(p) => Template::Static(p.clone()),
            Template::Dynamic(f) => Template::Dynamic(*f),
        }
    }
}

/// The termination argument a rule author declares for their rule (spec
/// §4.7 "Termination"): which of the three permitted guarantees this rule
/// relies on, checked structurally at [`RuleEngine::new`] time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every consequent strictly reduces the total J-connector count
    /// relative to the antecedent match.
    JCountReduces,
    /// Every consequent is strictly smaller (node count) than what it
    /// replaces.
    SizeReduces,
    /// The rule may repeat emissions; the engine deduplicates by the
    /// canonical notation of the produced hyperedge so repeats don't count
    /// as progress.
    Idempotent,
}

/// One rewrite rule: an antecedent pattern, a priority (lower runs first),
/// a set of directives fired per binding, an optional guard evaluated
/// before the directives (used by built-ins to check a runtime property
/// the pattern grammar can't express, e.g. "is this argument a
/// conjunction"), and the termination argument the author is declaring.
pub struct Rule {
    pub id: String,
    pub antecedent: Pattern,
    pub directives: Vec<Directive>,
    pub priority: i32,
    pub termination: Termination,
    pub guard: Option<fn(&Binding) -> bool>,
}

/// A recoverable rule-engine failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleEngineError {
    #[error("rule '{rule_id}' is non-terminating: {reason}")]
    NonTerminating { rule_id: String, reason: String },

    #[error("rule '{rule_id}' referenced unbound variable '{name}' in its consequent")]
    UnboundVariable { rule_id: String, name: String },

    #[error("rule '{rule_id}' produced an ill-typed consequent: {reason}")]
    InvalidConsequent { rule_id: String, reason: String },

    #[error("rule engine exceeded its iteration limit of {limit}")]
    IterationLimitExceeded { limit: usize },

    #[error("rule engine run was cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },

    #[error("rule file parse error: {0}")]
    Parse(String),
}
