//! Error taxonomy for type inference and hyperedge construction.

use crate::{RoleCode, TypeCode};

/// Failure to infer a composite hyperedge's type from its connector and
/// argument types. Each variant names the specific rule that could not
/// apply; [`TypeError::rule_name`] gives the stable identifier used in
/// diagnostics (matching the rule names `IR-M`, `IR-B`, `IR-T`, `IR-P`,
/// `IR-J`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// No inference rule's connector type matched at all.
    #[error("connector type {0:?} cannot head a composite hyperedge: no inference rule applies")]
    UninferableConnector(TypeCode),

    /// `IR-M` requires exactly one argument.
    #[error("modifier (M) connector takes exactly one argument, got {0}")]
    ModifierArity(usize),

    /// `IR-B` requires at least two `C`-typed arguments.
    #[error("builder (B) connector requires at least two concept arguments")]
    BuilderNoArguments,

    /// `IR-B` argument at `index` was not of type `C`.
    #[error("builder (B) argument at position {index} has type {found:?}, expected C")]
    InvalidBuilderArgument { index: usize, found: TypeCode },

    /// `IR-T` requires exactly one argument of type `C` or `R`.
    #[error("trigger (T) connector requires a single C or R argument, got {0:?}")]
    InvalidTriggerArgument(TypeCode),

    /// `IR-P` argument at `index` was not one of `{C, R, S}`.
    #[error("predicate (P) argument at position {index} has disallowed type {found:?}")]
    InvalidPredicateArgument { index: usize, found: TypeCode },

    /// `IR-J` requires two or more arguments sharing a single type drawn
    /// from `{C, R}`.
    #[error("conjunction (J) requires two or more same-typed C or R arguments, got {0:?}")]
    HeterogeneousConjunction(Vec<TypeCode>),
}

impl TypeError {
    /// Stable identifier for the rule that failed, used by callers that
    /// need a machine-readable cause rather than the display message.
    #[must_use]
    pub fn rule_name(&self) -> &'static str {
        match self {
            TypeError::UninferableConnector(_) => "no-inference-rule-applies",
            TypeError::ModifierArity(_) => "IR-M",
            TypeError::BuilderNoArguments | TypeError::InvalidBuilderArgument { .. } => "IR-B",
            TypeError::InvalidTriggerArgument(_) => "IR-T",
            TypeError::InvalidPredicateArgument { .. } => "IR-P",
            TypeError::HeterogeneousConjunction(_) => "IR-J",
        }
    }
}

/// Failure to validate an atom's role code or a composite's argument
/// structure against the role/arity invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Unrecognized single-character type code.
    #[error("unrecognized type code '{0}'")]
    UnknownTypeCode(char),

    /// Unrecognized single-character role code.
    #[error("unrecognized role code '{0}'")]
    UnknownRoleCode(char),

    /// `role` is not in the set of roles admitted by `type_code`'s
    /// connectors.
    #[error("role '{role}' is not valid for a {type_code} connector's arguments")]
    IncompatibleRole { type_code: TypeCode, role: RoleCode },

    /// A `P`-connector composite had more than ten arguments.
    #[error("predicate has {0} arguments, exceeding the maximum of 10")]
    TooManyArguments(usize),

    /// A role restricted to appearing at most once (`s`, `p`, `a`) appeared
    /// `count` times among a single composite's arguments.
    #[error("role '{role}' appears {count} times among predicate arguments; at most one is allowed")]
    DuplicateRole { role: RoleCode, count: usize },
}

/// Aggregate error for [`crate::Hyperedge::new_edge`]: either the connector
/// and arguments did not type-check, or they type-checked but violated a
/// role/arity invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HyperedgeError {
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
