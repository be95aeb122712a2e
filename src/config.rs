//! Configuration System (C9)
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - `SH_LOG_LEVEL` (the only environment variable the core reads; spec §6.7
//!   states "no other environment influence is permitted by the core")
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [engine]
//! max_arguments = 10
//! max_rule_iterations = 1000
//!
//! [rules]
//! rule_dir = "./rules"
//! ```
//!
//! Environment variable override:
//! ```bash
//! SH_LOG_LEVEL=debug
//! ```

use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Parser and rule-engine hardening limits (spec §7/§9, C11 "Execution
/// Hardening").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum argument arity of any composite hyperedge (invariant I4).
    #[serde(default = "default_max_arguments")]
    pub max_arguments: usize,

    /// Maximum fixed-point iterations before the rule engine aborts rather
    /// than spin forever on a non-terminating rule set.
    #[serde(default = "default_max_rule_iterations")]
    pub max_rule_iterations: usize,

    /// Wall-clock budget for a single `RuleEngine::run` call (`None` =
    /// unbounded).
    #[serde(default)]
    pub rule_engine_timeout: Option<Duration>,

    /// Maximum number of hyperedges a single pattern match may enumerate
    /// before the matcher aborts (guards against combinatorial unordered-set
    /// blowup).
    #[serde(default = "default_max_match_results")]
    pub max_match_results: usize,
}

fn default_max_arguments() -> usize {
    10
}
fn default_max_rule_iterations() -> usize {
    1000
}
fn default_max_match_results() -> usize {
    100_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_arguments: default_max_arguments(),
            max_rule_iterations: default_max_rule_iterations(),
            rule_engine_timeout: None,
            max_match_results: default_max_match_results(),
        }
    }
}

/// Where the rule engine loads its `.rules` rule-file sources from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Directory scanned for `*.rules` files at startup.
    #[serde(default = "default_rule_dir")]
    pub rule_dir: PathBuf,

    /// Apply the built-in rules (conjunction decomposition, anaphora
    /// resolution) in addition to anything loaded from `rule_dir`.
    #[serde(default = "default_true")]
    pub enable_builtin_rules: bool,
}

fn default_rule_dir() -> PathBuf {
    PathBuf::from("./rules")
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            rule_dir: default_rule_dir(),
            enable_builtin_rules: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for rolling file output (`None` = stdout only).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Merges in order:
    /// 1. `config.toml` (base configuration)
    /// 2. `config.local.toml` (local overrides, git-ignored)
    /// 3. `SH_LOG_LEVEL`, the one environment variable the core reads
    pub fn load() -> Result<Self, figment::Error> {
        let mut config: Config =
            Figment::from(figment::providers::Serialized::defaults(Config::default()))
                .merge(Toml::file("config.toml"))
                .merge(Toml::file("config.local.toml"))
                .extract()?;
        config.apply_log_level_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        let mut config: Config =
            Figment::from(figment::providers::Serialized::defaults(Config::default()))
                .merge(Toml::file(path))
                .extract()?;
        config.apply_log_level_env();
        Ok(config)
    }

    /// `SH_LOG_LEVEL` overrides `logging.level` if set; no other
    /// environment variable influences configuration (spec §6.7).
    fn apply_log_level_env(&mut self) {
        if let Ok(level) = std::env::var("SH_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            rules: RulesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
