//! Pattern Language (C6): a typed pattern AST mirroring `Hyperedge`'s shape,
//! plus variables, role constraints, and sequence/unordered wildcards
//! (spec §4.6/§6.4).
//!
//! Patterns parse through the same grammar as plain hyperedges
//! ([`crate::notation`]), extended with `$VAR`, `*`, `...`, and `{ … }`.
//! Pattern construction can fail ([`PatternError`]); matching never does —
//! see [`matcher`].

pub mod matcher;

pub use matcher::{match_pattern, Binding};

use crate::notation::{NotationGrammar, Rule, SyntaxError};
use hypergraph_ast::{RoleCode, TypeCode, ValidationError};
use pest::iterators::Pair;
use pest::Parser;

/// A malformed pattern, detected at construction time (spec §4.6
/// `PatternError`). Runtime matching never throws — it returns an empty
/// binding list instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("pattern node at byte {position}: {reason}")]
    Invalid { position: usize, reason: String },
}

/// A typed pattern, parallel to [`hypergraph_ast::Hyperedge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `label/TYPE[.role]`, any field may be absent (a wildcard on that
    /// axis) except the node shape itself (an atom pattern never matches a
    /// composite).
    Atom {
        label: Option<String>,
        type_code: Option<TypeCode>,
        role_code: Option<RoleCode>,
    },
    /// `$X[/TYPE][:role]` — binds the matched sub-hyperedge to `name`.
    Variable {
        name: String,
        type_constraint: Option<TypeCode>,
        role_constraint: Option<RoleCode>,
    },
    /// `*[/TYPE]` — matches any hyperedge, optionally constrained by type.
    Any { type_constraint: Option<TypeCode> },
    /// An ordered composite pattern, possibly containing one `...` sequence
    /// wildcard (at most one, tracked by its index into `elements`) and/or
    /// unordered-set sub-patterns.
    Edge {
        elements: Vec<Pattern>,
        sequence_wildcard_at: Option<usize>,
    },
    /// `{ … }` — the enclosed patterns may match a span of siblings in any
    /// order. Only legal as an element of an [`Pattern::Edge`].
    UnorderedSet(Vec<Pattern>),
}

impl Pattern {
    /// Parse a pattern from its textual form (spec §6.4).
    pub fn parse(input: &str) -> Result<Pattern, PatternError> {
        let mut pairs = NotationGrammar::parse(Rule::top_level, input)
            .map_err(SyntaxError::from_pest)?;
        let top = pairs.next().expect("top_level always yields one pair");
        let node = top.into_inner().next().expect("top_level wraps exactly one node");
        build_pattern(node)
    }

    /// Every variable name appearing anywhere in this pattern, in
    /// pre-order (first-bound-first), used to give [`Binding`] a
    /// deterministic ordering key (spec P3).
    #[must_use]
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variable_names(&mut names);
        names
    }

    fn collect_variable_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Variable { name, .. } => out.push(name),
            Pattern::Edge { elements, .. } => {
                for e in elements {
                    e.collect_variable_names(out);
                }
            }
            Pattern::UnorderedSet(elements) => {
                for e in elements {
                    e.collect_variable_names(out);
                }
            }
            Pattern::Atom { .. } | Pattern::Any { .. } => {}
        }
    }
}

fn build_pattern(pair: Pair<Rule>) -> Result<Pattern, PatternError> {
    match pair.as_rule() {
        Rule::atom => build_atom_pattern(pair),
        Rule::variable => build_variable_pattern(pair),
        Rule::wildcard => build_wildcard_pattern(pair),
        Rule::unordered_set => {
            let elements = pair
                .into_inner()
                .map(build_pattern)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Pattern::UnorderedSet(elements))
        }
        Rule::edge => {
            let position = pair.as_span().start();
            let children: Vec<Pair<Rule>> = pair.into_inner().collect();
            if children.is_empty() {
                return Err(PatternError::Invalid {
                    position,
                    reason: "an edge pattern needs at least a connector".to_string(),
                });
            }
            let mut elements = Vec::with_capacity(children.len());
            let mut sequence_wildcard_at = None;
            for child in children {
                if child.as_rule() == Rule::sequence_wildcard {
                    if sequence_wildcard_at.is_some() {
                        return Err(PatternError::Invalid {
                            position: child.as_span().start(),
                            reason: "a pattern may contain at most one `...`".to_string(),
                        });
                    }
                    sequence_wildcard_at = Some(elements.len());
                    elements.push(Pattern::Any { type_constraint: None });
                    continue;
                }
                elements.push(build_pattern(child)?);
            }
            Ok(Pattern::Edge { elements, sequence_wildcard_at })
        }
        other => Err(PatternError::Invalid {
            position: pair.as_span().start(),
            reason: format!("unexpected pattern node {other:?}"),
        }),
    }
}

fn build_atom_pattern(pair: Pair<Rule>) -> Result<Pattern, PatternError> {
    let position = pair.as_span().start();
    let mut label = None;
    let mut type_code = None;
    let mut role_code = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::label => label = Some(unquote(part.as_str())),
            Rule::type_code => {
                type_code = Some(parse_type(part.as_str(), position)?);
            }
            Rule::role_suffix => {
                role_code = Some(parse_role(part.as_str(), position)?);
            }
            _ => {}
        }
    }
    Ok(Pattern::Atom {
        label,
        type_code,
        role_code,
    })
}

fn build_variable_pattern(pair: Pair<Rule>) -> Result<Pattern, PatternError> {
    let position = pair.as_span().start();
    let mut name = None;
    let mut type_constraint = None;
    let mut role_constraint = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::var_name => name = Some(part.as_str().to_string()),
            Rule::type_code => type_constraint = Some(parse_type(part.as_str(), position)?),
            Rule::role_suffix => {
                let suffix = part.as_str();
                if suffix.len() != 1 {
                    return Err(PatternError::Invalid {
                        position,
                        reason: format!("role constraint '{suffix}' must be a single role letter"),
                    });
                }
                role_constraint = Some(parse_role(suffix, position)?);
            }
            _ => {}
        }
    }
    Ok(Pattern::Variable {
        name: name.expect("variable always has a name"),
        type_constraint,
        role_constraint,
    })
}

fn build_wildcard_pattern(pair: Pair<Rule>) -> Result<Pattern, PatternError> {
    let position = pair.as_span().start();
    let mut type_constraint = None;
    for part in pair.into_inner() {
        if part.as_rule() == Rule::type_code {
            type_constraint = Some(parse_type(part.as_str(), position)?);
        }
    }
    Ok(Pattern::Any { type_constraint })
}

fn parse_type(s: &str, position: usize) -> Result<TypeCode, PatternError> {
    TypeCode::from_char(s.chars().next().expect("type_code is non-empty"))
        .map_err(|e| invalid(e, position))
}

fn parse_role(s: &str, position: usize) -> Result<RoleCode, PatternError> {
    RoleCode::from_char(s.chars().next().expect("role_suffix is non-empty"))
        .map_err(|e| invalid(e, position))
}

fn invalid(err: ValidationError, position: usize) -> PatternError {
    PatternError::Invalid {
        position,
        reason: err.to_string(),
    }
}

fn unquote(label: &str) -> String {
    if let Some(stripped) = label.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        stripped.to_string()
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_wildcard() {
        let p = Pattern::parse("*").unwrap();
        assert!(matches!(p, Pattern::Any { type_constraint: None }));
    }

    #[test]
    fn parses_typed_wildcard() {
        let p = Pattern::parse("*/T").unwrap();
        assert!(matches!(p, Pattern::Any { type_constraint: Some(TypeCode::T) }));
    }

    #[test]
    fn parses_role_constrained_variable() {
        let p = Pattern::parse("$X:s").unwrap();
        assert!(matches!(
            p,
            Pattern::Variable { role_constraint: Some(RoleCode::Subject), .. }
        ));
    }

    #[test]
    fn parses_sequence_wildcard_inside_edge() {
        let p = Pattern::parse("(and/J bananas/C ...)").unwrap();
        let Pattern::Edge { sequence_wildcard_at, .. } = p else { panic!() };
        assert_eq!(sequence_wildcard_at, Some(2));
    }

    #[test]
    fn rejects_two_sequence_wildcards() {
        let err = Pattern::parse("(and/J ... ...)").unwrap_err();
        assert!(matches!(err, PatternError::Invalid { .. }));
    }

    #[test]
    fn variable_names_are_in_preorder() {
        let p = Pattern::parse("(accuse/P $X:s $Y:o $Z/S)").unwrap();
        assert_eq!(p.variable_names(), vec!["X", "Y", "Z"]);
    }
}
