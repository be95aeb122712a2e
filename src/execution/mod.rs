//! Execution Hardening Module (C11)
//!
//! Provides production-grade guardrails around rule-engine execution:
//! - Timeout enforcement for `RuleEngine::run`'s fixed-point loop
//! - Resource limits (argument arity, iteration count, match result size)
//! - Whole-pattern match memoization
//!
//! ## Example
//!
//! ```rust,no_run
//! use semhg::execution::{ExecutionConfig, ResourceLimits};
//! use std::time::Duration;
//!
//! let config = ExecutionConfig::default().with_timeout(Duration::from_secs(30));
//! ```

mod cache;
mod limits;
mod timeout;

pub use cache::{CacheStats, MatchCache};
pub use limits::{ResourceCounter, ResourceError, ResourceLimits};
pub use timeout::{with_timeout, with_timeout_result, CancelHandle, RunTimeout, TimeoutError};

use crate::config::EngineConfig;
use std::time::Duration;

/// Bundles the hardening facilities a [`crate::rules::RuleEngine`] run is
/// configured with.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Fixed-point run timeout (`None` = no timeout).
    pub timeout: Option<Duration>,

    /// Resource limits (arity, iteration count, match result size).
    pub limits: ResourceLimits,

    /// Whether to memoize whole-pattern match results.
    pub enable_match_cache: bool,

    /// Maximum entries in the match cache.
    pub max_cache_entries: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            timeout: None,
            limits: ResourceLimits::default(),
            enable_match_cache: true,
            max_cache_entries: 10_000,
        }
    }
}

impl ExecutionConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn from_engine_config(config: &EngineConfig) -> Self {
        ExecutionConfig {
            timeout: config.rule_engine_timeout,
            limits: ResourceLimits::from(config),
            enable_match_cache: true,
            max_cache_entries: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_execution_config_has_no_timeout() {
        let config = ExecutionConfig::default();
        assert!(config.timeout.is_none());
        assert!(config.enable_match_cache);
    }

    #[test]
    fn from_engine_config_carries_limits() {
        let engine_config = EngineConfig::default();
        let config = ExecutionConfig::from_engine_config(&engine_config);
        assert_eq!(config.limits.max_arguments, engine_config.max_arguments);
    }
}
