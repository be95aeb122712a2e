//! The candidate-scoring heuristic `h` of spec §4.5: an ordered tuple
//! compared via `Ord`, so "the highest-scoring candidate whose types
//! satisfy an IR-rule is applied" is literally `Ord::cmp` on this tuple,
//! and ties fall back to the documented rule rank
//! `IR-M < IR-B < IR-T < IR-P < IR-J`.

use std::cmp::Ordering;

/// The fixed tie-break rank among inference rules (spec §4.5 point 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleRank {
    M,
    B,
    T,
    P,
    J,
}

/// A candidate grouping action's score. Lower is better on every axis
/// *except* coverage, where more consumed siblings is better — so we store
/// `Reverse`-style fields directly in the natural "smaller tuple wins"
/// comparison order by negating coverage's sense via subtraction from a
/// ceiling, keeping the whole type a plain `Ord` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeuristicScore {
    /// (a) smaller dependency distance between connector and argument.
    dependency_distance: u32,
    /// (b) shallower nesting depth.
    nesting_depth: u32,
    /// (c) earlier rule rank: IR-B before IR-P before IR-T, folded into
    /// the documented total rank IR-M < IR-B < IR-T < IR-P < IR-J.
    rule_rank: RuleRank,
    /// (d) exhaustive consumption of siblings: fewer *unconsumed* siblings
    /// wins, so this also sorts ascending like the rest of the tuple.
    unconsumed_siblings: u32,
}

impl HeuristicScore {
    #[must_use]
    pub fn new(
        dependency_distance: u32,
        nesting_depth: u32,
        rule_rank: RuleRank,
        unconsumed_siblings: u32,
    ) -> Self {
        HeuristicScore {
            dependency_distance,
            nesting_depth,
            rule_rank,
            unconsumed_siblings,
        }
    }
}

/// Pick the best-scoring candidate among several, per spec §4.5 point 5.
/// Returns `None` for an empty candidate list.
#[must_use]
pub fn best<T>(candidates: Vec<(HeuristicScore, T)>) -> Option<T> {
    candidates
        .into_iter()
        .min_by(|(a, _), (b, _)| a.cmp(b).then(Ordering::Equal))
        .map(|(_, candidate)| candidate)
}
