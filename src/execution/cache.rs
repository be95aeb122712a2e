//! Match Cache Module (C11)
//!
//! Memoizes whole-pattern match results *across* repeated `match_pattern`
//! calls against the same target hyperedge. A single recursive match already
//! visits each `(pattern-node, target-node)` pair once (see
//! `crate::pattern::matcher`); this cache instead amortizes the common case
//! of re-running the *same* pattern against a KB that hasn't changed the
//! particular edge in question.
//!
//! Hyperedges are immutable value types identified by their canonical
//! notation — a cached `(pattern, target)` result never goes stale, so the
//! only eviction pressure is a capacity bound, not correctness.

use crate::pattern::matcher::Binding;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cache statistics, exposed for diagnostics/observability.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// A bounded memoization table keyed by `(pattern notation, target notation)`.
pub struct MatchCache {
    entries: DashMap<(String, String), Vec<Binding>>,
    max_entries: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl MatchCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        MatchCache {
            entries: DashMap::new(),
            max_entries,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Look up a cached result, recording a hit or miss.
    #[must_use]
    pub fn get(&self, pattern_key: &str, target_key: &str) -> Option<Vec<Binding>> {
        let key = (pattern_key.to_string(), target_key.to_string());
        match self.entries.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert a freshly computed result, evicting an arbitrary entry first
    /// if the cache is at capacity.
    pub fn insert(&self, pattern_key: &str, target_key: &str, bindings: Vec<Binding>) {
        if self.entries.len() >= self.max_entries {
            if let Some(evict) = self.entries.iter().next().map(|e| e.key().clone()) {
                self.entries.remove(&evict);
            }
        }
        self.entries
            .insert((pattern_key.to_string(), target_key.to_string()), bindings);
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        MatchCache::new(10_000)
    }
}
