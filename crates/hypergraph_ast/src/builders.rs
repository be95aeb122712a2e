//! Builder patterns for hyperedge construction.
//!
//! Fluent APIs for assembling atoms and composites by hand, primarily
//! useful in tests and in the notation codec.
//!
//! ## Example
//!
//! ```rust
//! use hypergraph_ast::{AtomBuilder, EdgeBuilder, TypeCode};
//!
//! // (is/P sky/C blue/C)
//! let edge = EdgeBuilder::new(AtomBuilder::new("is", TypeCode::P).build())
//!     .arg(AtomBuilder::new("sky", TypeCode::C).build())
//!     .arg(AtomBuilder::new("blue", TypeCode::C).build())
//!     .build()
//!     .unwrap();
//! assert_eq!(edge.type_code(), TypeCode::R);
//! ```

use crate::{Atom, Hyperedge, HyperedgeError, RoleCode, TypeCode};

/// Builder for a single [`Atom`].
#[derive(Debug, Clone)]
pub struct AtomBuilder {
    label: String,
    type_code: TypeCode,
    role_code: Option<RoleCode>,
    lemma: Option<String>,
}

impl AtomBuilder {
    /// Start building an atom with the given label and type code.
    #[must_use]
    pub fn new(label: impl Into<String>, type_code: TypeCode) -> Self {
        AtomBuilder {
            label: label.into(),
            type_code,
            role_code: None,
            lemma: None,
        }
    }

    /// Attach a role code. Compatibility against a connector type is
    /// checked at [`Hyperedge::new_edge`] time, not here.
    #[must_use]
    pub fn role(mut self, role: RoleCode) -> Self {
        self.role_code = Some(role);
        self
    }

    /// Attach a lemma.
    #[must_use]
    pub fn lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Finish building the atom.
    #[must_use]
    pub fn build(self) -> Atom {
        Atom {
            label: self.label,
            type_code: self.type_code,
            role_code: self.role_code,
            lemma: self.lemma,
        }
    }

    /// Finish building the atom, wrapped as a [`Hyperedge`].
    #[must_use]
    pub fn build_edge(self) -> Hyperedge {
        Hyperedge::atom(self.build())
    }
}

/// Builder for a composite [`Hyperedge`]: a connector plus its arguments.
#[derive(Debug, Clone)]
pub struct EdgeBuilder {
    connector: Hyperedge,
    arguments: Vec<Hyperedge>,
}

impl EdgeBuilder {
    /// Start building a composite headed by `connector`.
    #[must_use]
    pub fn new(connector: Atom) -> Self {
        EdgeBuilder {
            connector: Hyperedge::atom(connector),
            arguments: Vec::new(),
        }
    }

    /// Start building a composite headed by an already-built connector
    /// hyperedge (itself possibly composite, e.g. a trigger built from a
    /// builder expression).
    #[must_use]
    pub fn with_connector(connector: Hyperedge) -> Self {
        EdgeBuilder {
            connector,
            arguments: Vec::new(),
        }
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, argument: Hyperedge) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args(mut self, arguments: impl IntoIterator<Item = Hyperedge>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// Finish building, inferring the composite's type and validating
    /// argument roles.
    pub fn build(self) -> Result<Hyperedge, HyperedgeError> {
        let mut elements = Vec::with_capacity(self.arguments.len() + 1);
        elements.push(self.connector);
        elements.extend(self.arguments);
        Hyperedge::new_edge(elements)
    }
}
