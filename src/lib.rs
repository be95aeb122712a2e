//! # Semantic Hypergraph Engine
//!
//! Parses natural language into typed hyperedges, matches patterns over
//! them, and derives new knowledge through a fixed-point rewrite engine.
//!
//! ## Pipeline
//!
//! ```text
//! text
//!   │  (external dependency parser, out of scope)
//!   ▼
//! [dependency::Token] sequence
//!   │
//!   ▼
//! [alpha]      per-token classification        → typed atom sequence
//!   │
//!   ▼
//! [beta]       dependency-guided assembly       → one root Hyperedge
//!   │
//!   ▼
//! [kb]         insertion, dedup, indexing       → knowledge base
//!   │
//!   ▼
//! [rules]      pattern-matched rewriting        → fixed point
//! ```
//!
//! [`notation`] and [`pattern`] sit alongside every stage: the former is
//! the textual form hyperedges round-trip through, the latter is what rules
//! and subscriptions match against. [`config`], [`diagnostics`], and
//! [`execution`] are ambient concerns that wrap the pipeline rather than
//! participate in it.
//!
//! ## Example
//!
//! ```rust
//! use semhg::dependency::Token;
//! use semhg::{alpha, beta, kb::Kb, notation, rules::RuleEngine, execution::ResourceLimits};
//!
//! let tokens = vec![
//!     Token { surface: "Alice".into(), pos: "PROPN".into(), dep: "nsubj".into(),
//!             head_pos: "X".into(), head_dep: "X".into(), pos_after: "X".into(),
//!             index: 0, head_index: 1 },
//!     Token { surface: "likes".into(), pos: "VERB".into(), dep: "ROOT".into(),
//!             head_pos: "X".into(), head_dep: "X".into(), pos_after: "X".into(),
//!             index: 1, head_index: 1 },
//!     Token { surface: "bananas".into(), pos: "NOUN".into(), dep: "dobj".into(),
//!             head_pos: "X".into(), head_dep: "X".into(), pos_after: "X".into(),
//!             index: 2, head_index: 1 },
//! ];
//! let classifier = alpha::TableClassifier::new();
//! let (atoms, errors) = alpha::classify_tokens(&tokens, &classifier);
//! assert!(errors.is_empty());
//! let assembled = beta::assemble(&tokens, &atoms).unwrap();
//! assert_eq!(notation::print(&assembled.hyperedge), "(likes/P alice/C.s bananas/C.o)");
//!
//! let kb = Kb::new();
//! kb.insert(assembled.hyperedge);
//! let mut engine = RuleEngine::with_builtins();
//! engine.run(&kb, &ResourceLimits::default(), None).unwrap();
//! ```

pub mod alpha;
pub mod beta;
pub mod config;
pub mod dependency;
pub mod diagnostics;
pub mod execution;
pub mod kb;
pub mod notation;
pub mod pattern;
pub mod rules;

pub use hypergraph_ast::{infer, Atom, Hyperedge, HyperedgeError, RoleCode, TypeCode, TypeError};

use alpha::Classifier;
use beta::BetaError;
use config::Config;
use dependency::Token;
use diagnostics::{Diagnostics, DiagnosticsReport};
use execution::{CancelHandle, ExecutionConfig, ResourceLimits};
use kb::Kb;
use rules::{RuleEngine, RuleEngineError, RuleRunReport};

/// A sentence's tokens, grouped for [`Engine::ingest_document`]: one slice
/// per sentence boundary, each independently run through α then β so one
/// sentence's failure never blocks another's (spec §7 "never silently
/// drops data").
pub type Sentence = Vec<Token>;

/// Orchestrates the full pipeline (spec §2): ingest sentences into a
/// [`Kb`], then run the [`RuleEngine`] to a fixed point. Holds no state of
/// its own beyond the configuration and rule engine — the [`Kb`] a caller
/// passes in is the actual store, so multiple `Engine`s may share or
/// operate over independent KBs.
pub struct Engine {
    config: Config,
    rule_engine: RuleEngine,
    execution: ExecutionConfig,
}

impl Engine {
    /// Construct an engine from configuration, loading built-in rules
    /// (conjunction decomposition, anaphora resolution) if
    /// `config.rules.enable_builtin_rules` is set, plus any rules parsed
    /// from `config.rules.rule_dir` (spec §6.5/§6.7).
    ///
    /// # Errors
    ///
    /// Returns an error if a `*.rules` file under `rule_dir` fails to parse
    /// or declares a non-terminating rule (spec §4.7 "Violations raise
    /// `RuleEngineError` at load time").
    pub fn new(config: Config) -> Result<Self, RuleEngineError> {
        let mut rule_set = Vec::new();
        if config.rules.enable_builtin_rules {
            rule_set.extend(rules::builtin::builtin_rules());
        }
        if let Ok(entries) = std::fs::read_dir(&config.rules.rule_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "rules") {
                    let source = std::fs::read_to_string(&path)
                        .map_err(|e| RuleEngineError::Parse(format!("{}: {e}", path.display())))?;
                    rule_set.extend(rules::parser::parse_rules(&source)?);
                }
            }
        }
        let execution = ExecutionConfig::from_engine_config(&config.engine);
        Ok(Engine {
            rule_engine: RuleEngine::new(rule_set)?,
            config,
            execution,
        })
    }

    /// An engine with default configuration and only the built-in rules
    /// loaded — no `rule_dir` scan.
    #[must_use]
    pub fn with_builtins() -> Self {
        Engine {
            config: Config::default(),
            rule_engine: RuleEngine::with_builtins(),
            execution: ExecutionConfig::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn rule_engine(&self) -> &RuleEngine {
        &self.rule_engine
    }

    #[must_use]
    pub fn execution_config(&self) -> &ExecutionConfig {
        &self.execution
    }

    /// Run α then β over every sentence, inserting whatever hyperedges
    /// assemble successfully into `kb` and recording every per-sentence
    /// failure in the returned [`Diagnostics`] rather than aborting the
    /// whole document (spec §7).
    pub fn ingest_document(
        &self,
        sentences: &[Sentence],
        classifier: &dyn Classifier,
        kb: &Kb,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for tokens in sentences {
            self.ingest_sentence(tokens, classifier, kb, &mut diagnostics);
        }
        diagnostics
    }

    fn ingest_sentence(
        &self,
        tokens: &[Token],
        classifier: &dyn Classifier,
        kb: &Kb,
        diagnostics: &mut Diagnostics,
    ) {
        let (atoms, alpha_errors) = alpha::classify_tokens(tokens, classifier);
        for err in &alpha_errors {
            diagnostics.record_alpha_error(err);
        }
        match beta::assemble(tokens, &atoms) {
            Ok(output) => {
                kb.insert(output.hyperedge);
                diagnostics.record_parsed(output.warnings);
            }
            Err(err) => diagnostics.record_beta_error(&err),
        }
    }

    /// Run the rule engine to a fixed point over `kb`, honoring the
    /// configured timeout and resource limits (spec §4.7, C11).
    pub fn run_rules(
        &mut self,
        kb: &Kb,
        cancel: Option<&CancelHandle>,
    ) -> Result<RuleRunReport, RuleEngineError> {
        let limits = ResourceLimits::from(&self.config.engine);
        self.rule_engine.run(kb, &limits, cancel)
    }
}

/// Parse a single sentence's tokens straight through to a hyperedge,
/// skipping the `Kb`/rule-engine machinery — a convenience for callers that
/// only need α+β (e.g. notation round-trip tests). α failures are
/// non-fatal (the affected tokens are simply discarded before β runs); the
/// only failure mode here is β not assembling the surviving atoms into a
/// single hyperedge.
///
/// # Errors
///
/// Returns [`BetaError`] if the surviving atoms don't assemble into a
/// single connected hyperedge.
pub fn parse_sentence(
    tokens: &[Token],
    classifier: &dyn Classifier,
) -> Result<Hyperedge, BetaError> {
    let (atoms, _alpha_errors) = alpha::classify_tokens(tokens, classifier);
    beta::assemble(tokens, &atoms).map(|output| output.hyperedge)
}

/// Report the outcome of an [`Engine::ingest_document`] call without
/// retaining the per-sentence detail, for callers that only want counts
/// (spec §7 `DiagnosticsReport`).
#[must_use]
pub fn summarize(diagnostics: &Diagnostics) -> DiagnosticsReport {
    diagnostics.report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alpha::TableClassifier;

    fn token(index: u32, surface: &str, pos: &str, dep: &str, head_index: u32) -> Token {
        Token {
            surface: surface.into(),
            pos: pos.into(),
            dep: dep.into(),
            head_pos: "X".into(),
            head_dep: "X".into(),
            pos_after: "X".into(),
            index,
            head_index,
        }
    }

    #[test]
    fn engine_ingests_a_document_and_runs_builtins() {
        let kb = Kb::new();
        let classifier = TableClassifier::new();
        let sentences = vec![vec![
            token(0, "Alice", "PROPN", "nsubj", 1),
            token(1, "likes", "VERB", "ROOT", 1),
            token(2, "bananas", "NOUN", "dobj", 1),
            token(3, "and", "CCONJ", "cc", 2),
            token(4, "apples", "NOUN", "conj", 2),
        ]];
        let mut engine = Engine::with_builtins();
        let diagnostics = engine.ingest_document(&sentences, &classifier, &kb);
        assert_eq!(diagnostics.report().malformed_sentences, 0);

        engine.run_rules(&kb, None).unwrap();
        let edges: Vec<String> = kb
            .iter(None)
            .into_iter()
            .map(|(_, h)| notation::print(&h))
            .collect();
        assert!(edges.contains(&"(likes/P alice/C.s bananas/C)".to_string()));
        assert!(edges.contains(&"(likes/P alice/C.s apples/C)".to_string()));
    }

    #[test]
    fn malformed_sentence_is_recorded_not_fatal() {
        let kb = Kb::new();
        let classifier = TableClassifier::new();
        let disconnected = vec![vec![
            token(0, "Alice", "PROPN", "ROOT", 0),
            token(1, "Bob", "PROPN", "ROOT", 1),
        ]];
        let engine = Engine::with_builtins();
        let diagnostics = engine.ingest_document(&disconnected, &classifier, &kb);
        assert_eq!(diagnostics.report().malformed_sentences, 1);
        assert!(kb.is_empty());
    }

    #[test]
    fn parse_sentence_is_a_convenience_shortcut() {
        let classifier = TableClassifier::new();
        let tokens = vec![
            token(0, "Alice", "PROPN", "nsubj", 1),
            token(1, "likes", "VERB", "ROOT", 1),
            token(2, "bananas", "NOUN", "dobj", 1),
        ];
        let h = parse_sentence(&tokens, &classifier).unwrap();
        assert_eq!(notation::print(&h), "(likes/P alice/C.s bananas/C.o)");
    }
}
