//! Execution Hardening Limits (C11)
//!
//! Enforces the resource bounds the rule engine and matcher must respect so
//! that a pathological pattern or rule set fails loudly instead of spinning
//! or exhausting memory:
//! - Argument arity (invariant I4: at most 10 arguments per composite).
//! - Rule-engine fixed-point iteration count.
//! - Pattern match result-set size.
//!
//! ## Design
//!
//! Cooperative checking: callers invoke `check_*` methods at the natural
//! points where the corresponding count grows (pushing an argument, starting
//! another fixed-point pass, appending a match).

use std::sync::atomic::{AtomicUsize, Ordering};

/// A resource limit was exceeded.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceError {
    /// A composite hyperedge would exceed the argument-arity invariant.
    #[error("argument arity limit exceeded: {actual} arguments, limit {limit}")]
    ArityExceeded { limit: usize, actual: usize },

    /// The rule engine ran for more fixed-point iterations than permitted.
    #[error("rule engine iteration limit exceeded: {actual} iterations, limit {limit}")]
    IterationLimitExceeded { limit: usize, actual: usize },

    /// A single pattern match enumerated more bindings than permitted.
    #[error("match result limit exceeded: {actual} bindings, limit {limit}")]
    MatchResultLimitExceeded { limit: usize, actual: usize },
}

/// Resource limits configuration, derived from [`crate::config::EngineConfig`].
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum argument arity of any composite hyperedge (invariant I4).
    pub max_arguments: usize,

    /// Maximum fixed-point iterations the rule engine will run.
    pub max_rule_iterations: usize,

    /// Maximum bindings a single pattern match may enumerate.
    pub max_match_results: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        ResourceLimits {
            max_arguments: 10,
            max_rule_iterations: 1000,
            max_match_results: 100_000,
        }
    }
}

impl From<&crate::config::EngineConfig> for ResourceLimits {
    fn from(config: &crate::config::EngineConfig) -> Self {
        ResourceLimits {
            max_arguments: config.max_arguments,
            max_rule_iterations: config.max_rule_iterations,
            max_match_results: config.max_match_results,
        }
    }
}

impl ResourceLimits {
    #[must_use]
    pub fn check_arity(&self, argument_count: usize) -> Result<(), ResourceError> {
        if argument_count > self.max_arguments {
            return Err(ResourceError::ArityExceeded {
                limit: self.max_arguments,
                actual: argument_count,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn check_iteration(&self, iteration: usize) -> Result<(), ResourceError> {
        if iteration > self.max_rule_iterations {
            return Err(ResourceError::IterationLimitExceeded {
                limit: self.max_rule_iterations,
                actual: iteration,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn check_match_results(&self, result_count: usize) -> Result<(), ResourceError> {
        if result_count > self.max_match_results {
            return Err(ResourceError::MatchResultLimitExceeded {
                limit: self.max_match_results,
                actual: result_count,
            });
        }
        Ok(())
    }
}

/// A shared, thread-safe counter used to track a running total against a
/// [`ResourceLimits`] bound (e.g. cumulative bindings enumerated across a
/// `parallel` matcher invocation).
#[derive(Debug, Default)]
pub struct ResourceCounter(AtomicUsize);

impl ResourceCounter {
    #[must_use]
    pub fn new() -> Self {
        ResourceCounter(AtomicUsize::new(0))
    }

    pub fn add(&self, n: usize) -> usize {
        self.0.fetch_add(n, Ordering::Relaxed) + n
    }

    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_within_invariant_i4_passes() {
        let limits = ResourceLimits::default();
        assert!(limits.check_arity(10).is_ok());
        assert!(limits.check_arity(11).is_err());
    }

    #[test]
    fn iteration_limit_rejects_runaway_fixed_point() {
        let limits = ResourceLimits::default();
        assert!(limits.check_iteration(1000).is_ok());
        assert!(limits.check_iteration(1001).is_err());
    }

    #[test]
    fn resource_counter_accumulates() {
        let counter = ResourceCounter::new();
        assert_eq!(counter.add(3), 3);
        assert_eq!(counter.add(4), 7);
        assert_eq!(counter.get(), 7);
    }
}
