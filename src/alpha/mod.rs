//! α-Parser: per-token feature extraction and classifier inference
//! producing a typed atom sequence, preserving token order.
//!
//! The α-stage is stateless — any number of threads may call
//! [`classify_tokens`] concurrently over disjoint token slices.

mod table_classifier;

pub use table_classifier::TableClassifier;

use crate::dependency::Token;
use hypergraph_ast::{Atom, TypeCode};

/// The canonical α-classifier output domain (spec §6.2): one of the six
/// atomic type codes, or `Discard` for tokens that carry no SH meaning
/// (punctuation, determiners, auxiliaries the grammar doesn't model).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLabel {
    C,
    P,
    M,
    B,
    T,
    J,
    Discard,
}

impl ClassLabel {
    /// The atomic type code this label denotes, or `None` for `Discard`.
    #[must_use]
    pub fn to_type_code(self) -> Option<TypeCode> {
        match self {
            ClassLabel::C => Some(TypeCode::C),
            ClassLabel::P => Some(TypeCode::P),
            ClassLabel::M => Some(TypeCode::M),
            ClassLabel::B => Some(TypeCode::B),
            ClassLabel::T => Some(TypeCode::T),
            ClassLabel::J => Some(TypeCode::J),
            ClassLabel::Discard => None,
        }
    }
}

/// The canonical F5 feature tuple (spec §4.4/§6.2): `{TAG, DEP, HDEP, HPOS,
/// POS_AFTER}`. A `Classifier` must depend only on these five fields, even
/// though [`Token`] carries more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    pub tag: String,
    pub dep: String,
    pub hdep: String,
    pub hpos: String,
    pub pos_after: String,
}

impl From<&Token> for FeatureVector {
    fn from(token: &Token) -> Self {
        FeatureVector {
            tag: token.pos.clone(),
            dep: token.dep.clone(),
            hdep: token.head_dep.clone(),
            hpos: token.head_pos.clone(),
            pos_after: token.pos_after.clone(),
        }
    }
}

/// A pluggable token classifier. Any implementation returning one of
/// `{C, P, M, B, T, J, Discard}` is acceptable; the β-parser depends only on
/// this trait, never on a specific implementation.
pub trait Classifier: Send + Sync {
    /// Classify a single token's feature vector. Must return a label, never
    /// fail — per spec §6.2 "no probability is required; the interface
    /// returns the argmax".
    fn classify(&self, features: &FeatureVector) -> ClassLabel;

    /// Human-readable reason a token was discarded, used to populate
    /// [`AlphaError::reason`]. The default is generic; classifiers with
    /// richer introspection (e.g. [`TableClassifier`]) may override it.
    fn reason_for_discard(&self, features: &FeatureVector) -> String {
        format!("no classification rule matched tag '{}'", features.tag)
    }
}

/// A recoverable token-labeling failure: the classifier discarded a token
/// that α could not assign a type to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token {token_index}: {reason}")]
pub struct AlphaError {
    pub token_index: u32,
    pub reason: String,
}

/// A typed atom produced by the α-stage, still carrying its originating
/// token index so the β-parser can consult the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedAtom {
    pub atom: Atom,
    pub token_index: u32,
}

/// Normalize a token's surface form into an atom label: lowercase, with
/// internal whitespace stripped (per spec §3 "lowercase, whitespace-free").
#[must_use]
pub fn normalize_label(surface: &str) -> String {
    surface
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Classify every token in a sentence, producing typed atoms in original
/// token order plus the list of recoverable discard errors encountered.
/// Discarded tokens are simply omitted from the atom sequence — the
/// β-parser never sees them.
#[must_use]
pub fn classify_tokens(
    tokens: &[Token],
    classifier: &dyn Classifier,
) -> (Vec<TypedAtom>, Vec<AlphaError>) {
    let mut atoms = Vec::with_capacity(tokens.len());
    let mut errors = Vec::new();
    for token in tokens {
        let features = FeatureVector::from(token);
        let label = classifier.classify(&features);
        match label.to_type_code() {
            Some(type_code) => atoms.push(TypedAtom {
                atom: Atom::new(normalize_label(&token.surface), type_code),
                token_index: token.index,
            }),
            None => errors.push(AlphaError {
                token_index: token.index,
                reason: classifier.reason_for_discard(&features),
            }),
        }
    }
    (atoms, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysConcept;
    impl Classifier for AlwaysConcept {
        fn classify(&self, _features: &FeatureVector) -> ClassLabel {
            ClassLabel::C
        }
    }

    fn token(surface: &str, pos: &str, index: u32) -> Token {
        Token {
            surface: surface.into(),
            pos: pos.into(),
            dep: "dep".into(),
            head_pos: "X".into(),
            head_dep: "X".into(),
            pos_after: "X".into(),
            index,
            head_index: index,
        }
    }

    #[test]
    fn classify_tokens_preserves_order_and_normalizes_labels() {
        let tokens = vec![token("Alice", "PROPN", 0), token("Bananas", "NOUN", 1)];
        let (atoms, errors) = classify_tokens(&tokens, &AlwaysConcept);
        assert!(errors.is_empty());
        assert_eq!(atoms[0].atom.label, "alice");
        assert_eq!(atoms[1].atom.label, "bananas");
        assert_eq!(atoms[0].token_index, 0);
        assert_eq!(atoms[1].token_index, 1);
    }

    struct AlwaysDiscard;
    impl Classifier for AlwaysDiscard {
        fn classify(&self, _features: &FeatureVector) -> ClassLabel {
            ClassLabel::Discard
        }
    }

    #[test]
    fn discarded_tokens_produce_alpha_errors_and_no_atoms() {
        let tokens = vec![token(".", "PUNCT", 0)];
        let (atoms, errors) = classify_tokens(&tokens, &AlwaysDiscard);
        assert!(atoms.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].token_index, 0);
    }
}
