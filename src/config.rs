//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - latlog.toml (default configuration)
//! - latlog.local.toml (git-ignored local overrides)
//! - Environment variables (LATLOG_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # latlog.toml
//! [engine]
//! default_gas = 50000
//! queue_strategy = "conclusions_first"
//!
//! [logging]
//! level = "debug"
//! format = "text"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! LATLOG_ENGINE__DEFAULT_GAS=1000
//! LATLOG_LOGGING__LEVEL=trace
//! ```

use crate::queue::{patch_order, PatchOrder};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Saturation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Gas budget used when the caller does not supply one
    #[serde(default = "default_gas")]
    pub default_gas: u64,

    /// Patch order driving the worklist
    #[serde(default)]
    pub queue_strategy: QueueStrategy,
}

/// Worklist ordering options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStrategy {
    /// Conclusion patches outrank apply patches, FIFO within a kind
    #[default]
    ConclusionsFirst,
    /// Plain FIFO across all patches
    Fifo,
}

impl QueueStrategy {
    /// The patch order this strategy selects.
    pub fn order(self) -> PatchOrder {
        match self {
            QueueStrategy::ConclusionsFirst => patch_order::conclusions_first,
            QueueStrategy::Fifo => patch_order::fifo,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_gas() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl EngineConfig {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. latlog.toml (base configuration)
    /// 2. latlog.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (LATLOG_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("latlog.toml"))
            .merge(Toml::file("latlog.local.toml"))
            .merge(Env::prefixed("LATLOG_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("LATLOG_").split("__"))
            .extract()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            engine: EngineSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_gas: default_gas(),
            queue_strategy: QueueStrategy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.engine.default_gas, 10_000);
        assert_eq!(config.engine.queue_strategy, QueueStrategy::ConclusionsFirst);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");

        // Verify it contains expected sections
        assert!(toml_str.contains("[engine]"));
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("default_gas"));
    }

    #[test]
    fn test_queue_strategy_round_trip() {
        let strategies = [QueueStrategy::ConclusionsFirst, QueueStrategy::Fifo];
        for strategy in strategies {
            let json = serde_json::to_string(&strategy).expect("serialize");
            let back: QueueStrategy = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(strategy, back);
        }
        assert_eq!(
            serde_json::to_string(&QueueStrategy::ConclusionsFirst).expect("serialize"),
            "\"conclusions_first\""
        );
    }
}
