//! The default, dependency-free classifier: a POS→type rule table.
//!
//! This is not a trained model — it is the "pluggable learner" default,
//! encoding common POS-to-SH-type heuristics so the crate is usable and
//! testable without an external ML dependency. Any other [`super::Classifier`]
//! implementation (e.g. a wrapped ONNX model) can be substituted at the
//! caller's discretion.

use super::{ClassLabel, Classifier, FeatureVector};

/// A deterministic classifier driven by a fixed part-of-speech table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableClassifier;

impl TableClassifier {
    #[must_use]
    pub fn new() -> Self {
        TableClassifier
    }
}

impl Classifier for TableClassifier {
    fn classify(&self, features: &FeatureVector) -> ClassLabel {
        match features.tag.as_str() {
            "VERB" | "AUX" => ClassLabel::P,
            "NOUN" | "PROPN" | "PRON" | "NUM" => ClassLabel::C,
            "ADJ" | "ADV" => ClassLabel::M,
            "ADP" => ClassLabel::T,
            "CCONJ" | "SCONJ" => ClassLabel::J,
            _ => ClassLabel::Discard,
        }
    }

    fn reason_for_discard(&self, features: &FeatureVector) -> String {
        match features.tag.as_str() {
            "PUNCT" => "punctuation carries no SH meaning".to_string(),
            "DET" => "determiners are not represented as atoms".to_string(),
            other => format!("tag '{other}' has no entry in the POS rule table"),
        }
    }
}
