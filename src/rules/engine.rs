//! The fixed-point rule-engine loop (spec §4.7).

use super::{Directive, Rule, RuleEngineError, Template, Termination};
use crate::execution::{CancelHandle, ResourceLimits};
use crate::kb::Kb;
use crate::pattern::matcher::Binding;
use crate::pattern::{match_pattern, Pattern};
use hypergraph_ast::Hyperedge;
use std::collections::HashSet;

/// Summary of one [`RuleEngine::run`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleRunReport {
    pub iterations: usize,
    pub edges_emitted: usize,
    pub edges_replaced: usize,
    pub edges_retracted: usize,
}

/// The priority-ordered, fixed-point rewrite engine (spec §4.7).
pub struct RuleEngine {
    rules: Vec<Rule>,
    idempotent_fingerprints: HashSet<String>,
}

impl RuleEngine {
    /// Construct an engine from a rule set, checking every rule's
    /// declared [`Termination`] guarantee structurally (spec "Violations
    /// raise `RuleEngineError` at load time").
    pub fn new(mut rules: Vec<Rule>) -> Result<Self, RuleEngineError> {
        for rule in &rules {
            check_termination(rule)?;
        }
        rules.sort_by_key(|r| r.priority);
        Ok(RuleEngine {
            rules,
            idempotent_fingerprints: HashSet::new(),
        })
    }

    /// The engine with the built-in conjunction-decomposition and
    /// anaphora-resolution rules pre-loaded (spec §4.7 "Built-in rules").
    pub fn with_builtins() -> Self {
        RuleEngine::new(super::builtin::builtin_rules())
            .expect("built-in rules always pass their own termination check")
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the fixed-point loop to completion: repeat priority-ordered
    /// rewrite passes until one produces no new hyperedge, the iteration
    /// limit is hit, or `cancel` is observed (spec §4.7 point 3, §5
    /// cancellation checkpoints).
    pub fn run(
        &mut self,
        kb: &Kb,
        limits: &ResourceLimits,
        cancel: Option<&CancelHandle>,
    ) -> Result<RuleRunReport, RuleEngineError> {
        let mut report = RuleRunReport::default();
        loop {
            if let Some(handle) = cancel {
                if handle.is_cancelled() {
                    return Err(RuleEngineError::Cancelled {
                        iterations: report.iterations,
                    });
                }
            }
            limits
                .check_iteration(report.iterations)
                .map_err(|_| RuleEngineError::IterationLimitExceeded {
                    limit: limits.max_rule_iterations,
                })?;

            let mut produced_new = false;
            for index in 0..self.rules.len() {
                produced_new |= self.apply_rule(index, kb, &mut report)?;
            }

            report.iterations += 1;
            if !produced_new {
                break;
            }
        }
        Ok(report)
    }

    fn apply_rule(
        &mut self,
        rule_index: usize,
        kb: &Kb,
        report: &mut RuleRunReport,
    ) -> Result<bool, RuleEngineError> {
        let mut targets = kb.iter(None);
        targets.sort_by_key(|(id, _)| *id);

        let mut produced_new = false;
        for (_, target) in targets {
            let bindings = match_pattern(&self.rules[rule_index].antecedent, &target);
            for binding in bindings {
                if let Some(guard) = self.rules[rule_index].guard {
                    if !guard(&binding) {
                        continue;
                    }
                }
                let directive_count = self.rules[rule_index].directives.len();
                for directive_index in 0..directive_count {
                    if self.apply_directive(rule_index, directive_index, &binding, kb, report)? {
                        produced_new = true;
                    }
                }
            }
        }
        Ok(produced_new)
    }

    fn apply_directive(
        &mut self,
        rule_index: usize,
        directive_index: usize,
        binding: &Binding,
        kb: &Kb,
        report: &mut RuleRunReport,
    ) -> Result<bool, RuleEngineError> {
        let rule_id = self.rules[rule_index].id.clone();
        let idempotent = self.rules[rule_index].termination == Termination::Idempotent;
        // Directives borrow immutably from `self.rules`; cloning the
        // relevant template references out isn't possible (closures aren't
        // `Clone`), so we re-borrow per call instead of holding it across
        // the dedup check below.
        match &self.rules[rule_index].directives[directive_index] {
            Directive::Emit(template) => {
                let candidates = instantiate_many(template, binding, &rule_id)?;
                let mut produced = false;
                for h in candidates {
                    if idempotent && !self.record_fingerprint(&h) {
                        continue;
                    }
                    let existed = kb.id_of(&h).is_some();
                    kb.insert(h);
                    if !existed {
                        report.edges_emitted += 1;
                        produced = true;
                    }
                }
                Ok(produced)
            }
            Directive::Replace(old_template, new_template) => {
                let old = instantiate_one(old_template, binding, &rule_id)?;
                let candidates = instantiate_many(new_template, binding, &rule_id)?;
                let Some(old_id) = kb.id_of(&old) else {
                    return Ok(false);
                };
                let mut produced = false;
                for new in candidates {
                    if idempotent && !self.record_fingerprint(&new) {
                        continue;
                    }
                    if kb.get(old_id).as_ref() == Some(&new) {
                        continue;
                    }
                    kb.replace(old_id, new);
                    report.edges_replaced += 1;
                    produced = true;
                }
                Ok(produced)
            }
            Directive::Retract(template) => {
                let h = instantiate_one(template, binding, &rule_id)?;
                match kb.id_of(&h) {
                    Some(id) if kb.get(id).is_some() => {
                        kb.retract(id);
                        report.edges_retracted += 1;
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
        }
    }

    fn record_fingerprint(&mut self, h: &Hyperedge) -> bool {
        self.idempotent_fingerprints
            .insert(crate::notation::print(h))
    }
}

fn instantiate_one(
    template: &Template,
    binding: &Binding,
    rule_id: &str,
) -> Result<Hyperedge, RuleEngineError> {
    let mut many = instantiate_many(template, binding, rule_id)?;
    many.pop().ok_or_else(|| RuleEngineError::InvalidConsequent {
        rule_id: rule_id.to_string(),
        reason: "template produced no hyperedge".to_string(),
    })
}

fn instantiate_many(
    template: &Template,
    binding: &Binding,
    rule_id: &str,
) -> Result<Vec<Hyperedge>, RuleEngineError> {
    match template {
        Template::Static(pattern) => Ok(vec![instantiate_static(pattern, binding, rule_id)?]),
        Template::Dynamic(f) => Ok(f(binding)),
    }
}

/// Substitute every variable in `pattern` with its bound hyperedge,
/// building a concrete consequent. Wildcards (`*`, `...`, `{…}`) have no
/// meaning in a consequent and are rejected.
fn instantiate_static(
    pattern: &Pattern,
    binding: &Binding,
    rule_id: &str,
) -> Result<Hyperedge, RuleEngineError> {
    match pattern {
        Pattern::Variable { name, .. } => {
            binding
                .get(name)
                .cloned()
                .ok_or_else(|| RuleEngineError::UnboundVariable {
                    rule_id: rule_id.to_string(),
                    name: name.clone(),
                })
        }
        Pattern::Atom { label, type_code, role_code } => {
            let label = label.clone().ok_or_else(|| RuleEngineError::InvalidConsequent {
                rule_id: rule_id.to_string(),
                reason: "consequent atom is missing a label".to_string(),
            })?;
            let type_code = type_code.ok_or_else(|| RuleEngineError::InvalidConsequent {
                rule_id: rule_id.to_string(),
                reason: "consequent atom is missing a type".to_string(),
            })?;
            let atom = hypergraph_ast::Atom::new(label, type_code);
            let atom = match role_code {
                Some(role) => atom.with_role(*role, type_code).map_err(|e| {
                    RuleEngineError::InvalidConsequent {
                        rule_id: rule_id.to_string(),
                        reason: e.to_string(),
                    }
                })?,
                None => atom,
            };
            Ok(Hyperedge::atom(atom))
        }
        Pattern::Edge { elements, sequence_wildcard_at: None } => {
            let built = elements
                .iter()
                .map(|e| instantiate_static(e, binding, rule_id))
                .collect::<Result<Vec<_>, _>>()?;
            Hyperedge::new_edge(built).map_err(|e| RuleEngineError::InvalidConsequent {
                rule_id: rule_id.to_string(),
                reason: e.to_string(),
            })
        }
        Pattern::Edge { sequence_wildcard_at: Some(_), .. }
        | Pattern::Any { .. }
        | Pattern::UnorderedSet(_) => Err(RuleEngineError::InvalidConsequent {
            rule_id: rule_id.to_string(),
            reason: "wildcards are not valid in a consequent template".to_string(),
        }),
    }
}

/// Structural, load-time check of a rule's declared termination guarantee
/// (spec §4.7 "Termination"). A rule with any `Template::Dynamic` directive
/// must declare [`Termination::Idempotent`] — its output can't be verified
/// to shrink by static inspection of the pattern/template text alone.
pub fn check_termination(rule: &Rule) -> Result<(), RuleEngineError> {
    let has_dynamic = rule.directives.iter().any(|d| {
        matches!(
            d,
            Directive::Emit(Template::Dynamic(_))
                | Directive::Replace(_, Template::Dynamic(_))
                | Directive::Retract(Template::Dynamic(_))
        )
    });
    if has_dynamic {
        return if rule.termination == Termination::Idempotent {
            Ok(())
        } else {
            Err(RuleEngineError::NonTerminating {
                rule_id: rule.id.clone(),
                reason: "a dynamic consequent template requires Termination::Idempotent"
                    .to_string(),
            })
        };
    }

    match rule.termination {
        Termination::Idempotent => Ok(()),
        Termination::JCountReduces => {
            let antecedent_j = static_j_count(&rule.antecedent);
            for directive in &rule.directives {
                for template in static_templates(directive) {
                    if static_template_j_count(template) >= antecedent_j {
                        return Err(RuleEngineError::NonTerminating {
                            rule_id: rule.id.clone(),
                            reason: format!(
                                "consequent J-count does not strictly reduce ({} >= {})",
                                static_template_j_count(template),
                                antecedent_j
                            ),
                        });
                    }
                }
            }
            Ok(())
        }
        Termination::SizeReduces => {
            let antecedent_size = static_size(&rule.antecedent);
            for directive in &rule.directives {
                for template in static_templates(directive) {
                    if static_template_size(template) >= antecedent_size {
                        return Err(RuleEngineError::NonTerminating {
                            rule_id: rule.id.clone(),
                            reason: format!(
                                "consequent size does not strictly reduce ({} >= {})",
                                static_template_size(template),
                                antecedent_size
                            ),
                        });
                    }
                }
            }
            Ok(())
        }
    }
}

fn static_templates(directive: &Directive) -> Vec<&Pattern> {
    match directive {
        Directive::Emit(Template::Static(p)) | Directive::Retract(Template::Static(p)) => {
            vec![p]
        }
        Directive::Replace(Template::Static(a), Template::Static(b)) => vec![a, b],
        _ => vec![],
    }
}

fn static_template_j_count(pattern: &Pattern) -> usize {
    static_j_count(pattern)
}

fn static_template_size(pattern: &Pattern) -> usize {
    static_size(pattern)
}

fn static_j_count(pattern: &Pattern) -> usize {
    match pattern {
        Pattern::Atom { type_code: Some(hypergraph_ast::TypeCode::J), .. } => 1,
        Pattern::Variable { type_constraint: Some(hypergraph_ast::TypeCode::J), .. } => 1,
        Pattern::Edge { elements, .. } => elements.iter().map(static_j_count).sum(),
        Pattern::UnorderedSet(elements) => elements.iter().map(static_j_count).sum(),
        _ => 0,
    }
}

fn static_size(pattern: &Pattern) -> usize {
    match pattern {
        Pattern::Edge { elements, .. } => 1 + elements.iter().map(static_size).sum::<usize>(),
        Pattern::UnorderedSet(elements) => elements.iter().map(static_size).sum(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation;

    fn rule(
        id: &str,
        antecedent: &str,
        consequent: &str,
        termination: Termination,
    ) -> Rule {
        Rule {
            id: id.to_string(),
            antecedent: Pattern::parse(antecedent).unwrap(),
            directives: vec![Directive::Emit(Template::Static(
                Pattern::parse(consequent).unwrap(),
            ))],
            priority: 0,
            termination,
            guard: None,
        }
    }

    #[test]
    fn size_reducing_rule_passes_load_time_check() {
        let r = rule(
            "shrink",
            "(claim/P $X:s $Y)",
            "$Y",
            Termination::SizeReduces,
        );
        assert!(check_termination(&r).is_ok());
    }

    #[test]
    fn non_shrinking_rule_fails_load_time_check() {
        let r = rule(
            "grow",
            "$X",
            "(wrap/B $X $X)",
            Termination::SizeReduces,
        );
        assert!(matches!(
            check_termination(&r),
            Err(RuleEngineError::NonTerminating { .. })
        ));
    }

    #[test]
    fn simple_rewrite_rule_runs_to_fixed_point() {
        let kb = Kb::new();
        kb.insert(notation::parse("(likes/P alice/C bananas/C)").unwrap());
        let r = rule(
            "extract-object",
            "(likes/P $X:s $Y)",
            "$Y",
            Termination::SizeReduces,
        );
        let mut engine = RuleEngine::new(vec![r]).unwrap();
        let report = engine.run(&kb, &ResourceLimits::default(), None).unwrap();
        assert_eq!(report.edges_emitted, 1);
        assert!(kb.id_of(&notation::parse("bananas/C").unwrap()).is_some());
    }

    #[test]
    fn dynamic_template_requires_idempotent_termination() {
        let r = Rule {
            id: "dyn".to_string(),
            antecedent: Pattern::parse("$X").unwrap(),
            directives: vec![Directive::Emit(Template::Dynamic(|_| vec![]))],
            priority: 0,
            termination: Termination::SizeReduces,
            guard: None,
        };
        assert!(matches!(
            check_termination(&r),
            Err(RuleEngineError::NonTerminating { .. })
        ));
    }
}
