//! Notation Codec (C3): bidirectional textual serialization of hyperedges
//! (spec §4.3/§6.3).
//!
//! `parse` is total on strings produced by `print` — `print ∘ parse` is the
//! identity up to whitespace normalization (P1). Adversarial input produces
//! a [`SyntaxError`] carrying the byte position pest stopped at.
//!
//! A single PEG grammar (`grammar.pest`) backs this module, [`crate::pattern`],
//! and [`highlight`] — each rejects the productions it doesn't understand.

pub mod highlight;

use hypergraph_ast::{Atom, Hyperedge, HyperedgeError, RoleCode, TypeCode, ValidationError};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "notation/grammar.pest"]
pub(crate) struct NotationGrammar;

/// Malformed textual input (spec §7 `SyntaxError`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at byte {position}: expected {expected}")]
pub struct SyntaxError {
    pub position: usize,
    pub expected: String,
}

impl SyntaxError {
    fn from_pest(err: pest::error::Error<Rule>) -> Self {
        let position = match err.location {
            pest::error::InputLocation::Pos(p) => p,
            pest::error::InputLocation::Span((s, _)) => s,
        };
        SyntaxError {
            position,
            expected: err.variant.message().to_string(),
        }
    }

    fn node(kind: &str, position: usize) -> Self {
        SyntaxError {
            position,
            expected: format!("a {kind} is not a well-formed hyperedge (only atoms and edges are)"),
        }
    }
}

/// Either the text was syntactically malformed, or it parsed but described
/// an ill-typed hyperedge (no inference rule applies, or a role/arity
/// invariant was violated) — both propagate to the caller per spec §7.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Hyperedge(#[from] HyperedgeError),
}

/// Parse a single hyperedge from its canonical (or any grammar-legal)
/// textual form.
pub fn parse(input: &str) -> Result<Hyperedge, NotationError> {
    let mut pairs = NotationGrammar::parse(Rule::top_level, input)
        .map_err(SyntaxError::from_pest)?;
    let top = pairs.next().expect("top_level always yields one pair");
    let node = top.into_inner().next().expect("top_level wraps exactly one node");
    Ok(build_hyperedge(node)?)
}

fn build_hyperedge(pair: Pair<Rule>) -> Result<Hyperedge, NotationError> {
    match pair.as_rule() {
        Rule::atom => Ok(Hyperedge::atom(build_atom(pair)?)),
        Rule::edge => {
            let position = pair.as_span().start();
            let mut children: Vec<Pair<Rule>> = pair.into_inner().collect();
            if children.is_empty() {
                return Err(SyntaxError::node("edge", position).into());
            }
            let connector_pair = children.remove(0);
            let (connector_atom, role_shorthand) = match connector_pair.as_rule() {
                Rule::atom => split_connector_role_shorthand(connector_pair)?,
                _ => {
                    let sub = build_hyperedge(connector_pair)?;
                    let mut elements = vec![sub];
                    for child in children {
                        elements.push(build_hyperedge(child)?);
                    }
                    return Ok(Hyperedge::new_edge(elements)?);
                }
            };
            let connector_type = connector_atom.type_code;
            let mut arguments = Vec::with_capacity(children.len());
            for child in children {
                arguments.push(build_hyperedge(child)?);
            }
            apply_role_shorthand(&mut arguments, role_shorthand, connector_type)?;
            let mut elements = Vec::with_capacity(arguments.len() + 1);
            elements.push(Hyperedge::atom(connector_atom));
            elements.extend(arguments);
            Ok(Hyperedge::new_edge(elements)?)
        }
        other => Err(SyntaxError::node(&format!("{other:?}"), pair.as_span().start()).into()),
    }
}

/// Build an atom, splitting off a role suffix longer than one character:
/// that's the shorthand-role form (`likes/P.so`) distributing roles over
/// the connector's positional arguments rather than a single-char role on
/// the atom itself. Returns the bare-role atom plus the leftover shorthand
/// string (empty if the suffix was absent or already a single role char).
fn split_connector_role_shorthand(pair: Pair<Rule>) -> Result<(Atom, String), NotationError> {
    let position = pair.as_span().start();
    let mut label = None;
    let mut type_code = None;
    let mut role_suffix = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::label => label = Some(part.as_str()),
            Rule::type_code => type_code = Some(part.as_str()),
            Rule::role_suffix => role_suffix = Some(part.as_str()),
            _ => {}
        }
    }
    let label = unquote(label.expect("atom always has a label"));
    let type_code = TypeCode::from_char(
        type_code
            .expect("atom always has a type_code")
            .chars()
            .next()
            .expect("type_code is non-empty"),
    )
    .map_err(|e| validation_as_syntax(e, position))?;
    let atom = Atom::new(label, type_code);
    match role_suffix {
        None => Ok((atom, String::new())),
        Some(suffix) if suffix.len() == 1 => {
            let role = RoleCode::from_char(suffix.chars().next().unwrap())
                .map_err(|e| validation_as_syntax(e, position))?;
            // A single-char suffix on the connector atom itself (not on an
            // argument) carries no role semantics per spec §3 (roles are
            // only valid on P/B *arguments*); keep the atom bare and treat
            // the char as shorthand for a single argument, consistent with
            // the multi-char case.
            Ok((atom, role.as_char().to_string()))
        }
        Some(suffix) => Ok((atom, suffix.to_string())),
    }
}

fn apply_role_shorthand(
    arguments: &mut [Hyperedge],
    shorthand: String,
    connector_type: TypeCode,
) -> Result<(), NotationError> {
    if shorthand.is_empty() {
        return Ok(());
    }
    for (slot, role_char) in arguments.iter_mut().zip(shorthand.chars()) {
        let Hyperedge::Atom(atom) = slot else { continue };
        if atom.role_code.is_some() {
            continue;
        }
        let role = RoleCode::from_char(role_char)
            .map_err(|e| validation_as_syntax(e, 0))?;
        *atom = atom.clone().with_role(role, connector_type).map_err(HyperedgeError::from)?;
    }
    Ok(())
}

fn validation_as_syntax(err: ValidationError, position: usize) -> NotationError {
    NotationError::Syntax(SyntaxError {
        position,
        expected: err.to_string(),
    })
}

fn build_atom(pair: Pair<Rule>) -> Result<Atom, NotationError> {
    let position = pair.as_span().start();
    let mut label = None;
    let mut type_code = None;
    let mut role_suffix = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::label => label = Some(part.as_str()),
            Rule::type_code => type_code = Some(part.as_str()),
            Rule::role_suffix => role_suffix = Some(part.as_str()),
            _ => {}
        }
    }
    let label = unquote(label.expect("atom always has a label"));
    let type_code = TypeCode::from_char(
        type_code
            .expect("atom always has a type_code")
            .chars()
            .next()
            .expect("type_code is non-empty"),
    )
    .map_err(|e| validation_as_syntax(e, position))?;
    let mut atom = Atom::new(label, type_code);
    if let Some(suffix) = role_suffix {
        if suffix.len() == 1 {
            let role = RoleCode::from_char(suffix.chars().next().unwrap())
                .map_err(|e| validation_as_syntax(e, position))?;
            // Role validity against the *owning* connector is checked when
            // this atom is placed as an argument (`apply_role_shorthand` /
            // `Hyperedge::new_edge`'s own validation); here we only know the
            // role was syntactically well-formed. We still need a concrete
            // connector type to call `with_role`, so provisionally validate
            // against both P and B and accept if either admits it — the
            // authoritative check happens again in `new_edge`.
            atom.role_code = Some(role);
        }
    }
    Ok(atom)
}

fn unquote(label: &str) -> String {
    if let Some(stripped) = label.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        stripped.to_string()
    } else {
        label.to_string()
    }
}

/// Render a hyperedge in canonical form: `label/TYPE[.role]` for atoms,
/// `(c a1 a2 … an)` for edges. Labels are quoted only when they contain
/// characters outside `[a-z0-9_]`.
#[must_use]
pub fn print(hyperedge: &Hyperedge) -> String {
    match hyperedge {
        Hyperedge::Atom(atom) => print_atom(atom),
        Hyperedge::Edge { elements, .. } => {
            let parts: Vec<String> = elements.iter().map(print).collect();
            format!("({})", parts.join(" "))
        }
    }
}

fn print_atom(atom: &Atom) -> String {
    let label = print_label(&atom.label);
    match atom.role_code {
        Some(role) => format!("{label}/{}.{role}", atom.type_code),
        None => format!("{label}/{}", atom.type_code),
    }
}

fn print_label(label: &str) -> String {
    let plain = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        label.to_string()
    } else {
        format!("\"{label}\"")
    }
}
