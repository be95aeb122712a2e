//! Core atom/hyperedge/type-lattice types for the semantic hypergraph engine.
//!
//! This crate has no knowledge of parsing, pattern matching, or storage — it
//! defines the value types every other layer builds on:
//!
//! - [`TypeCode`] and [`RoleCode`]: the fixed type and role alphabets.
//! - [`Atom`]: a leaf token carrying a label, type code, optional role code
//!   and lemma.
//! - [`Hyperedge`]: an atom or an ordered, recursively-nested composite whose
//!   type is derived from its connector and arguments via [`infer`].
//!
//! Type inference is pure and total over well-formed input: given a connector
//! type and the types of its arguments, [`infer`] either returns the single
//! resulting type code or a [`TypeError`] explaining which rule failed to
//! apply. No hidden state, no I/O.

#![forbid(unsafe_code)]

mod builders;
mod error;

pub use builders::{AtomBuilder, EdgeBuilder};
pub use error::{HyperedgeError, TypeError, ValidationError};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The fixed type alphabet: atomic types `{C, P, M, B, T, J}` plus the two
/// composite-only types `{R, S}` that only ever appear as the inferred type
/// of a composite hyperedge, never as an atom's own type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeCode {
    /// Concept
    C,
    /// Predicate
    P,
    /// Modifier
    M,
    /// Builder
    B,
    /// Trigger
    T,
    /// Conjunction
    J,
    /// Relation (composite-only)
    R,
    /// Specifier (composite-only)
    S,
}

impl TypeCode {
    /// The six type codes an atom is allowed to carry directly.
    pub const ATOMIC: [TypeCode; 6] = [
        TypeCode::C,
        TypeCode::P,
        TypeCode::M,
        TypeCode::B,
        TypeCode::T,
        TypeCode::J,
    ];

    /// Whether this type code may be assigned to an atom. `R` and `S` only
    /// ever arise from [`infer`] on a composite hyperedge.
    #[must_use]
    pub fn is_atomic(self) -> bool {
        Self::ATOMIC.contains(&self)
    }

    /// Whether this type code may head (be the connector type of) a
    /// composite hyperedge. Only `{M, B, T, P, J}` do.
    #[must_use]
    pub fn can_connect(self) -> bool {
        matches!(self, TypeCode::M | TypeCode::B | TypeCode::T | TypeCode::P | TypeCode::J)
    }

    /// Single-character notation form, e.g. `TypeCode::C.as_char() == 'C'`.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            TypeCode::C => 'C',
            TypeCode::P => 'P',
            TypeCode::M => 'M',
            TypeCode::B => 'B',
            TypeCode::T => 'T',
            TypeCode::J => 'J',
            TypeCode::R => 'R',
            TypeCode::S => 'S',
        }
    }

    /// Parse a single-character type code, as it appears after `/` in
    /// notation (e.g. `dog/C`).
    pub fn from_char(c: char) -> Result<Self, ValidationError> {
        match c {
            'C' => Ok(TypeCode::C),
            'P' => Ok(TypeCode::P),
            'M' => Ok(TypeCode::M),
            'B' => Ok(TypeCode::B),
            'T' => Ok(TypeCode::T),
            'J' => Ok(TypeCode::J),
            'R' => Ok(TypeCode::R),
            'S' => Ok(TypeCode::S),
            other => Err(ValidationError::UnknownTypeCode(other)),
        }
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The fixed role alphabet used to tag an atom's argument position within
/// its immediately enclosing composite. Which roles are admissible depends
/// on the *connector's* type code: `P` connectors admit
/// `{s,p,a,c,o,i,t,j,x,r}`, `B` connectors admit `{m,a}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleCode {
    /// `s` — subject
    Subject,
    /// `p` — passive subject
    PassiveSubject,
    /// `a` — agent
    Agent,
    /// `c` — complement / attribute
    Complement,
    /// `o` — direct object
    Object,
    /// `i` — indirect object
    IndirectObject,
    /// `t` — temporal or topical argument
    Topic,
    /// `j` — conjunctive argument
    Conjunctive,
    /// `x` — unspecified / extra argument
    Extra,
    /// `r` — relative-clause argument
    Relative,
    /// `m` — modifier argument (builder connectors only)
    Modifier,
}

impl RoleCode {
    /// The ten roles a `P`-typed connector admits, in notation order.
    pub const PREDICATE_ROLES: [RoleCode; 10] = [
        RoleCode::Subject,
        RoleCode::PassiveSubject,
        RoleCode::Agent,
        RoleCode::Complement,
        RoleCode::Object,
        RoleCode::IndirectObject,
        RoleCode::Topic,
        RoleCode::Conjunctive,
        RoleCode::Extra,
        RoleCode::Relative,
    ];

    /// The two roles a `B`-typed connector admits.
    pub const BUILDER_ROLES: [RoleCode; 2] = [RoleCode::Modifier, RoleCode::Agent];

    /// Single-character notation form, e.g. `RoleCode::Subject.as_char() == 's'`.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            RoleCode::Subject => 's',
            RoleCode::PassiveSubject => 'p',
            RoleCode::Agent => 'a',
            RoleCode::Complement => 'c',
            RoleCode::Object => 'o',
            RoleCode::IndirectObject => 'i',
            RoleCode::Topic => 't',
            RoleCode::Conjunctive => 'j',
            RoleCode::Extra => 'x',
            RoleCode::Relative => 'r',
            RoleCode::Modifier => 'm',
        }
    }

    /// Parse a single-character role code, as it appears after `:` in
    /// notation (e.g. `dog/C:s`).
    pub fn from_char(c: char) -> Result<Self, ValidationError> {
        match c {
            's' => Ok(RoleCode::Subject),
            'p' => Ok(RoleCode::PassiveSubject),
            'a' => Ok(RoleCode::Agent),
            'c' => Ok(RoleCode::Complement),
            'o' => Ok(RoleCode::Object),
            'i' => Ok(RoleCode::IndirectObject),
            't' => Ok(RoleCode::Topic),
            'j' => Ok(RoleCode::Conjunctive),
            'x' => Ok(RoleCode::Extra),
            'r' => Ok(RoleCode::Relative),
            'm' => Ok(RoleCode::Modifier),
            other => Err(ValidationError::UnknownRoleCode(other)),
        }
    }

    /// Whether this role is admissible as an argument of a connector with
    /// the given type code. Only `P` and `B` connectors carry role-tagged
    /// arguments; every other connector type admits no roles at all.
    #[must_use]
    pub fn allowed_for(self, connector_type: TypeCode) -> bool {
        match connector_type {
            TypeCode::P => Self::PREDICATE_ROLES.contains(&self),
            TypeCode::B => Self::BUILDER_ROLES.contains(&self),
            _ => false,
        }
    }
}

impl std::fmt::Display for RoleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A leaf token: a label (surface form or synthesized name), its type code,
/// an optional role it plays in the immediately enclosing composite, and an
/// optional lemma (base form) used by `IR-B` lemma concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub label: String,
    pub type_code: TypeCode,
    pub role_code: Option<RoleCode>,
    pub lemma: Option<String>,
}

impl Atom {
    /// Construct a role-less, lemma-less atom. Always succeeds: a bare type
    /// code with no role has nothing to validate against.
    #[must_use]
    pub fn new(label: impl Into<String>, type_code: TypeCode) -> Self {
        Atom {
            label: label.into(),
            type_code,
            role_code: None,
            lemma: None,
        }
    }

    /// Attach a role, validating it against the connector type that will
    /// eventually own this atom as an argument.
    pub fn with_role(
        mut self,
        role: RoleCode,
        connector_type: TypeCode,
    ) -> Result<Self, ValidationError> {
        if !role.allowed_for(connector_type) {
            return Err(ValidationError::IncompatibleRole {
                type_code: connector_type,
                role,
            });
        }
        self.role_code = Some(role);
        Ok(self)
    }

    /// Attach a lemma (base form), e.g. `"runs"` -> lemma `"run"`.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// The lemma if present, else the label itself.
    #[must_use]
    pub fn lemma_or_label(&self) -> &str {
        self.lemma.as_deref().unwrap_or(&self.label)
    }
}

/// A hyperedge: either a single atom, or an ordered, non-empty sequence of
/// hyperedges headed by a connector (`elements[0]`) whose type determines
/// the composite's own type via [`infer`].
///
/// The composite's type is computed once at construction time and cached,
/// so [`Hyperedge::type_code`] is O(1) regardless of nesting depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hyperedge {
    Atom(Atom),
    Edge {
        elements: Vec<Hyperedge>,
        type_code: TypeCode,
    },
}

impl Hyperedge {
    /// Wrap a bare atom as a hyperedge.
    #[must_use]
    pub fn atom(atom: Atom) -> Self {
        Hyperedge::Atom(atom)
    }

    /// Build a composite hyperedge from a connector and its arguments,
    /// inferring the resulting type via [`infer`].
    ///
    /// `elements[0]` is the connector; the rest are its arguments. Fails if
    /// `elements` has fewer than two entries (a connector needs at least one
    /// argument) or if no inference rule matches the connector/argument
    /// type combination.
    pub fn new_edge(elements: Vec<Hyperedge>) -> Result<Self, HyperedgeError> {
        if elements.len() < 2 {
            return Err(TypeError::BuilderNoArguments.into());
        }
        let connector_type = elements[0].type_code();
        let arg_types: Vec<TypeCode> = elements[1..].iter().map(Hyperedge::type_code).collect();
        let type_code = infer(connector_type, &arg_types)?;
        validate_argument_roles(&elements[1..], connector_type)?;
        Ok(Hyperedge::Edge { elements, type_code })
    }

    /// The type code of this hyperedge: the atom's own type code, or the
    /// composite's cached inferred type. O(1).
    #[must_use]
    pub fn type_code(&self) -> TypeCode {
        match self {
            Hyperedge::Atom(atom) => atom.type_code,
            Hyperedge::Edge { type_code, .. } => *type_code,
        }
    }

    /// The total number of atoms contained in this hyperedge (1 for a bare
    /// atom, otherwise the sum over all elements).
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Hyperedge::Atom(_) => 1,
            Hyperedge::Edge { elements, .. } => elements.iter().map(Hyperedge::size).sum(),
        }
    }

    /// Whether `needle` occurs anywhere within this hyperedge (including as
    /// the hyperedge itself), compared structurally.
    #[must_use]
    pub fn contains(&self, needle: &Hyperedge) -> bool {
        if self == needle {
            return true;
        }
        match self {
            Hyperedge::Atom(_) => false,
            Hyperedge::Edge { elements, .. } => elements.iter().any(|e| e.contains(needle)),
        }
    }

    /// The connector (first element) of a composite, or `None` for a bare
    /// atom.
    #[must_use]
    pub fn connector(&self) -> Option<&Hyperedge> {
        match self {
            Hyperedge::Atom(_) => None,
            Hyperedge::Edge { elements, .. } => elements.first(),
        }
    }

    /// The arguments (all but the connector) of a composite, or an empty
    /// slice for a bare atom.
    #[must_use]
    pub fn arguments(&self) -> &[Hyperedge] {
        match self {
            Hyperedge::Atom(_) => &[],
            Hyperedge::Edge { elements, .. } => &elements[1..],
        }
    }

    /// Whether this hyperedge is a bare atom (no nested structure).
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Hyperedge::Atom(_))
    }

    /// Lemma of the concept this hyperedge denotes, per `IR-B`: for an atom,
    /// its own lemma-or-label; for a builder composite, the arguments'
    /// lemmas concatenated with `_`; for anything else, `None`.
    #[must_use]
    pub fn lemma(&self) -> Option<String> {
        match self {
            Hyperedge::Atom(atom) => Some(atom.lemma_or_label().to_string()),
            Hyperedge::Edge { elements, type_code } if *type_code == TypeCode::C => {
                let parts: Option<Vec<String>> =
                    elements[1..].iter().map(Hyperedge::lemma).collect();
                parts.map(|parts| parts.join("_"))
            }
            Hyperedge::Edge { .. } => None,
        }
    }

    /// A process-local structural hash, suitable for deduplication within a
    /// single run but not a stable content-addressing scheme across
    /// processes or Rust versions.
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn validate_argument_roles(
    arguments: &[Hyperedge],
    connector_type: TypeCode,
) -> Result<(), ValidationError> {
    if connector_type == TypeCode::P && arguments.len() > 10 {
        return Err(ValidationError::TooManyArguments(arguments.len()));
    }
    let mut seen = Vec::new();
    for element in arguments {
        let Hyperedge::Atom(atom) = element else {
            continue;
        };
        let Some(role) = atom.role_code else {
            continue;
        };
        if !role.allowed_for(connector_type) {
            return Err(ValidationError::IncompatibleRole {
                type_code: connector_type,
                role,
            });
        }
        if matches!(role, RoleCode::Subject | RoleCode::PassiveSubject | RoleCode::Agent) {
            let count = seen.iter().filter(|r| **r == role).count() + 1;
            if count > 1 {
                return Err(ValidationError::DuplicateRole { role, count });
            }
            seen.push(role);
        }
    }
    Ok(())
}

/// Infer the type of a composite hyperedge from its connector type and the
/// types of its arguments, applying inference rules in the fixed tie-break
/// order `IR-M < IR-B < IR-T < IR-P < IR-J` (the connector's own type code
/// already selects at most one rule, so the order only matters for
/// diagnostics when none apply).
///
/// - `IR-M`: `(M x) -> type_of(x)`, exactly one argument.
/// - `IR-B`: `(B C C+) -> C`, two or more `C` arguments.
/// - `IR-T`: `(T y) -> S`, exactly one argument of type `C` or `R`.
/// - `IR-P`: `(P z+) -> R`, one or more arguments each of type `C`, `R` or
///   `S`.
/// - `IR-J`: `(J x x'+) -> type_of(x)`, two or more arguments sharing a
///   single type drawn from `{C, R}`.
pub fn infer(connector_type: TypeCode, arg_types: &[TypeCode]) -> Result<TypeCode, TypeError> {
    match connector_type {
        TypeCode::M => {
            if arg_types.len() != 1 {
                return Err(TypeError::ModifierArity(arg_types.len()));
            }
            Ok(arg_types[0])
        }
        TypeCode::B => {
            if arg_types.len() < 2 {
                return Err(TypeError::BuilderNoArguments);
            }
            if let Some((index, found)) = arg_types
                .iter()
                .enumerate()
                .find(|(_, t)| **t != TypeCode::C)
            {
                return Err(TypeError::InvalidBuilderArgument { index, found: *found });
            }
            Ok(TypeCode::C)
        }
        TypeCode::T => {
            if arg_types.len() != 1 {
                return Err(TypeError::InvalidTriggerArgument(
                    arg_types.first().copied().unwrap_or(TypeCode::C),
                ));
            }
            match arg_types[0] {
                TypeCode::C | TypeCode::R => Ok(TypeCode::S),
                other => Err(TypeError::InvalidTriggerArgument(other)),
            }
        }
        TypeCode::P => {
            if arg_types.is_empty() {
                return Err(TypeError::BuilderNoArguments);
            }
            if let Some((index, found)) = arg_types.iter().enumerate().find(|(_, t)| {
                !matches!(t, TypeCode::C | TypeCode::R | TypeCode::S)
            }) {
                return Err(TypeError::InvalidPredicateArgument { index, found: *found });
            }
            Ok(TypeCode::R)
        }
        TypeCode::J => {
            if arg_types.len() < 2 {
                return Err(TypeError::HeterogeneousConjunction(arg_types.to_vec()));
            }
            let first = arg_types[0];
            if !matches!(first, TypeCode::C | TypeCode::R) {
                return Err(TypeError::HeterogeneousConjunction(arg_types.to_vec()));
            }
            if arg_types.iter().any(|t| *t != first) {
                return Err(TypeError::HeterogeneousConjunction(arg_types.to_vec()));
            }
            Ok(first)
        }
        other => Err(TypeError::UninferableConnector(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(label: &str) -> Hyperedge {
        Hyperedge::atom(Atom::new(label, TypeCode::C))
    }

    fn predicate(label: &str) -> Hyperedge {
        Hyperedge::atom(Atom::new(label, TypeCode::P))
    }

    #[test]
    fn ir_m_inherits_argument_type() {
        let modifier = Hyperedge::atom(Atom::new("red", TypeCode::M));
        let edge = Hyperedge::new_edge(vec![modifier, concept("ball")]).unwrap();
        assert_eq!(edge.type_code(), TypeCode::C);
    }

    #[test]
    fn ir_m_rejects_wrong_arity() {
        let modifier = Hyperedge::atom(Atom::new("red", TypeCode::M));
        let err = Hyperedge::new_edge(vec![modifier, concept("ball"), concept("box")]).unwrap_err();
        assert!(matches!(err, HyperedgeError::Type(TypeError::ModifierArity(3))));
    }

    #[test]
    fn ir_b_builds_concept_from_concepts() {
        let builder = Hyperedge::atom(Atom::new("of", TypeCode::B));
        let edge = Hyperedge::new_edge(vec![builder, concept("president"), concept("brazil")])
            .unwrap();
        assert_eq!(edge.type_code(), TypeCode::C);
    }

    #[test]
    fn ir_b_lemma_concatenation() {
        let builder = Hyperedge::atom(Atom::new("of", TypeCode::B));
        let a = Hyperedge::atom(Atom::new("president", TypeCode::C).with_lemma("president"));
        let b = Hyperedge::atom(Atom::new("brazil", TypeCode::C).with_lemma("brazil"));
        let edge = Hyperedge::new_edge(vec![builder, a, b]).unwrap();
        assert_eq!(edge.lemma().as_deref(), Some("president_brazil"));
    }

    #[test]
    fn ir_t_wraps_concept_as_specifier() {
        let trigger = Hyperedge::atom(Atom::new("in", TypeCode::T));
        let edge = Hyperedge::new_edge(vec![trigger, concept("1920")]).unwrap();
        assert_eq!(edge.type_code(), TypeCode::S);
    }

    #[test]
    fn ir_p_builds_relation_from_predicate_arguments() {
        let pred = predicate("is");
        let edge = Hyperedge::new_edge(vec![pred, concept("sky"), concept("blue")]).unwrap();
        assert_eq!(edge.type_code(), TypeCode::R);
    }

    #[test]
    fn ir_p_rejects_non_concept_relation_specifier_argument() {
        let pred = predicate("is");
        let modifier = Hyperedge::atom(Atom::new("fast", TypeCode::M));
        let err = Hyperedge::new_edge(vec![pred, concept("sky"), modifier]).unwrap_err();
        assert!(matches!(
            err,
            HyperedgeError::Type(TypeError::InvalidPredicateArgument { index: 1, .. })
        ));
    }

    #[test]
    fn ir_j_requires_homogeneous_types() {
        let conj = Hyperedge::atom(Atom::new("and", TypeCode::J));
        let edge = Hyperedge::new_edge(vec![conj, concept("cats"), concept("dogs")]).unwrap();
        assert_eq!(edge.type_code(), TypeCode::C);
    }

    #[test]
    fn ir_j_rejects_mixed_types() {
        let conj = Hyperedge::atom(Atom::new("and", TypeCode::J));
        let pred = predicate("is");
        let rel = Hyperedge::new_edge(vec![pred, concept("sky"), concept("blue")]).unwrap();
        let err = Hyperedge::new_edge(vec![conj, concept("cats"), rel]).unwrap_err();
        assert!(matches!(
            err,
            HyperedgeError::Type(TypeError::HeterogeneousConjunction(_))
        ));
    }

    #[test]
    fn concept_or_relation_cannot_connect() {
        let err = infer(TypeCode::C, &[TypeCode::C]).unwrap_err();
        assert!(matches!(err, TypeError::UninferableConnector(TypeCode::C)));
    }

    #[test]
    fn role_must_match_connector_type() {
        let atom = Atom::new("dog", TypeCode::C);
        let err = atom.with_role(RoleCode::Subject, TypeCode::B).unwrap_err();
        assert!(matches!(err, ValidationError::IncompatibleRole { .. }));
    }

    #[test]
    fn predicate_argument_arity_limit() {
        let pred = predicate("relates");
        let args: Vec<Hyperedge> = (0..11).map(|i| concept(&format!("c{i}"))).collect();
        let mut elements = vec![pred];
        elements.extend(args);
        let err = Hyperedge::new_edge(elements).unwrap_err();
        assert!(matches!(
            err,
            HyperedgeError::Validation(ValidationError::TooManyArguments(11))
        ));
    }

    #[test]
    fn size_counts_atoms() {
        let builder = Hyperedge::atom(Atom::new("of", TypeCode::B));
        let edge = Hyperedge::new_edge(vec![builder, concept("president"), concept("brazil")])
            .unwrap();
        assert_eq!(edge.size(), 3);
    }

    #[test]
    fn contains_finds_nested_argument() {
        let builder = Hyperedge::atom(Atom::new("of", TypeCode::B));
        let needle = concept("brazil");
        let edge = Hyperedge::new_edge(vec![builder, concept("president"), needle.clone()])
            .unwrap();
        assert!(edge.contains(&needle));
        assert!(!edge.contains(&concept("argentina")));
    }
}
