//! Rule file format (spec §6.5): a line-oriented textual form for
//! [`super::Rule`] values, reusing the pattern grammar for pattern and
//! template bodies.
//!
//! ```text
//! rule RULE_ID priority=NN [idempotent]
//!   antecedent: PATTERN
//!   consequent: PATTERN
//! ```
//!
//! The consequent line accepts a bare pattern (shorthand for `emit`) or an
//! explicit directive keyword: `emit PATTERN`, `retract PATTERN`, or
//! `replace PATTERN with PATTERN`. A rule block may repeat the `consequent:`
//! line to fire more than one directive per binding.
//!
//! `[idempotent]` on the header line selects [`Termination::Idempotent`]
//! explicitly. Without it, the parser tries [`Termination::JCountReduces`]
//! then [`Termination::SizeReduces`] against [`super::check_termination`]
//! and keeps the first that passes — the textual grammar has no syntax to
//! name a termination argument directly, so this is the closest fit to
//! spec.md §6.5's single optional flag.

use super::{check_termination, Directive, Rule, RuleEngineError, Template, Termination};
use crate::pattern::Pattern;

/// Parse every `rule` block in `source`, in file order.
pub fn parse_rules(source: &str) -> Result<Vec<Rule>, RuleEngineError> {
    let mut rules = Vec::new();
    let mut lines = source.lines().enumerate().peekable();
    while let Some((lineno, line)) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !trimmed.starts_with("rule ") {
            return Err(parse_err(lineno, "expected a line starting with 'rule '"));
        }
        rules.push(parse_rule_block(trimmed, &mut lines)?);
    }
    Ok(rules)
}

fn parse_err(lineno: usize, reason: impl std::fmt::Display) -> RuleEngineError {
    RuleEngineError::Parse(format!("line {}: {}", lineno + 1, reason))
}

fn parse_rule_block<'a>(
    header: &str,
    lines: &mut std::iter::Peekable<impl Iterator<Item = (usize, &'a str)>>,
) -> Result<Rule, RuleEngineError> {
    let (id, priority, declared_idempotent) = parse_header(header)?;

    let mut antecedent = None;
    let mut directives = Vec::new();
    while let Some(&(lineno, line)) = lines.peek() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.next();
            continue;
        }
        if trimmed.starts_with("rule ") {
            break;
        }
        lines.next();
        if let Some(body) = trimmed.strip_prefix("antecedent:") {
            if antecedent.is_some() {
                return Err(parse_err(lineno, "rule has more than one antecedent: line"));
            }
            antecedent = Some(
                Pattern::parse(body.trim())
                    .map_err(|e| parse_err(lineno, format!("antecedent: {e}")))?,
            );
        } else if let Some(body) = trimmed.strip_prefix("consequent:") {
            directives.push(parse_directive(lineno, body.trim())?);
        } else {
            return Err(parse_err(
                lineno,
                "expected 'antecedent:' or 'consequent:'",
            ));
        }
    }

    let antecedent = antecedent.ok_or_else(|| {
        RuleEngineError::Parse(format!("rule '{id}' is missing an antecedent: line"))
    })?;
    if directives.is_empty() {
        return Err(RuleEngineError::Parse(format!(
            "rule '{id}' is missing a consequent: line"
        )));
    }

    let termination = resolve_termination(&id, &antecedent, &directives, declared_idempotent)?;
    Ok(Rule {
        id,
        antecedent,
        directives,
        priority,
        termination,
        guard: None,
    })
}

fn parse_header(header: &str) -> Result<(String, i32, bool), RuleEngineError> {
    let mut tokens = header.split_whitespace();
    tokens.next(); // "rule"
    let id = tokens
        .next()
        .ok_or_else(|| RuleEngineError::Parse("rule header is missing an id".to_string()))?
        .to_string();

    let mut priority = None;
    let mut idempotent = false;
    for token in tokens {
        if token == "idempotent" {
            idempotent = true;
        } else if let Some(value) = token.strip_prefix("priority=") {
            priority = Some(value.parse::<i32>().map_err(|_| {
                RuleEngineError::Parse(format!("invalid priority value '{value}'"))
            })?);
        } else {
            return Err(RuleEngineError::Parse(format!(
                "unrecognized rule header token '{token}'"
            )));
        }
    }
    let priority = priority
        .ok_or_else(|| RuleEngineError::Parse(format!("rule '{id}' is missing priority=NN")))?;
    Ok((id, priority, idempotent))
}

fn parse_directive(lineno: usize, body: &str) -> Result<Directive, RuleEngineError> {
    if let Some(rest) = body.strip_prefix("retract ") {
        let p = Pattern::parse(rest.trim()).map_err(|e| parse_err(lineno, e))?;
        return Ok(Directive::Retract(Template::Static(p)));
    }
    if let Some(rest) = body.strip_prefix("replace ") {
        let (old, new) = rest
            .split_once(" with ")
            .ok_or_else(|| parse_err(lineno, "'replace' directive needs '... with ...'"))?;
        let old = Pattern::parse(old.trim()).map_err(|e| parse_err(lineno, e))?;
        let new = Pattern::parse(new.trim()).map_err(|e| parse_err(lineno, e))?;
        return Ok(Directive::Replace(Template::Static(old), Template::Static(new)));
    }
    let rest = body.strip_prefix("emit ").unwrap_or(body);
    let p = Pattern::parse(rest.trim()).map_err(|e| parse_err(lineno, e))?;
    Ok(Directive::Emit(Template::Static(p)))
}

fn resolve_termination(
    id: &str,
    antecedent: &Pattern,
    directives: &[Directive],
    declared_idempotent: bool,
) -> Result<Termination, RuleEngineError> {
    if declared_idempotent {
        return Ok(Termination::Idempotent);
    }
    for candidate in [Termination::JCountReduces, Termination::SizeReduces] {
        let probe = Rule {
            id: id.to_string(),
            antecedent: antecedent.clone(),
            directives: directives.to_vec(),
            priority: 0,
            termination: candidate,
            guard: None,
        };
        if check_termination(&probe).is_ok() {
            return Ok(candidate);
        }
    }
    Err(RuleEngineError::NonTerminating {
        rule_id: id.to_string(),
        reason: "neither J-count nor size strictly reduces; mark the rule 'idempotent' \
                 if its termination relies on deduplication instead"
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_emit_rule_with_explicit_idempotent() {
        let src = "rule simplify priority=5 idempotent\n  antecedent: $X\n  consequent: $X\n";
        let rules = parse_rules(src).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, "simplify");
        assert_eq!(rules[0].priority, 5);
        assert_eq!(rules[0].termination, Termination::Idempotent);
    }

    #[test]
    fn auto_detects_size_reducing_termination_when_unflagged() {
        let src =
            "rule extract-object priority=0\n  antecedent: (likes/P $X:s $Y)\n  consequent: $Y\n";
        let rules = parse_rules(src).unwrap();
        assert_eq!(rules[0].termination, Termination::SizeReduces);
    }

    #[test]
    fn rejects_non_terminating_rule_with_no_flag() {
        let src = "rule grow priority=0\n  antecedent: $X\n  consequent: (wrap/B $X $X)\n";
        assert!(matches!(
            parse_rules(src),
            Err(RuleEngineError::NonTerminating { .. })
        ));
    }

    #[test]
    fn parses_replace_directive() {
        let src = "rule swap priority=0 idempotent\n  antecedent: $X\n  consequent: replace $X with $X\n";
        let rules = parse_rules(src).unwrap();
        assert!(matches!(rules[0].directives[0], Directive::Replace(_, _)));
    }

    #[test]
    fn parses_multiple_rule_blocks() {
        let src = "rule a priority=0 idempotent\n  antecedent: $X\n  consequent: $X\n\
                   rule b priority=1 idempotent\n  antecedent: $Y\n  consequent: $Y\n";
        let rules = parse_rules(src).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].id, "b");
    }

    #[test]
    fn rejects_missing_antecedent() {
        let src = "rule a priority=0 idempotent\n  consequent: $X\n";
        assert!(matches!(parse_rules(src), Err(RuleEngineError::Parse(_))));
    }
}
