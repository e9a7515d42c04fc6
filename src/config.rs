//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - Environment variables (TRACEMINE_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [mining]
//! max_fan_out = 20
//!
//! [mining.thresholds]
//! direct_follows_min = 5
//! dependency_measure_min = 0.8
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! TRACEMINE_MINING__MAX_FAN_OUT=12
//! TRACEMINE_MINING__THRESHOLDS__DEPENDENCY_MEASURE_MIN=0.9
//! ```

use crate::error::MineError;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Mining pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Ceiling on per-activity fan-in/out before binding enumeration is
    /// rejected; enumeration is exponential in this number.
    #[serde(default = "default_max_fan_out")]
    pub max_fan_out: usize,

    /// Dependency-graph thresholds (heuristic miner only)
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Dependency-graph thresholds.
///
/// The frequency threshold is signed so an out-of-range value is reported
/// as `InvalidThreshold` instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Drop direct-follow pairs with count below this (non-negative)
    #[serde(default)]
    pub direct_follows_min: i64,

    /// Drop pairs with dependency measure below this (in [0, 1])
    #[serde(default)]
    pub dependency_measure_min: f64,
}

impl Thresholds {
    /// Check both thresholds against their admissible ranges.
    pub fn validate(&self) -> Result<(), MineError> {
        if self.direct_follows_min < 0 {
            return Err(MineError::InvalidThreshold {
                parameter: "direct_follows_min".to_string(),
                value: self.direct_follows_min as f64,
                expected: "a non-negative integer".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.dependency_measure_min) {
            return Err(MineError::InvalidThreshold {
                parameter: "dependency_measure_min".to_string(),
                value: self.dependency_measure_min,
                expected: "a value in [0, 1]".to_string(),
            });
        }
        Ok(())
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
fn default_max_fan_out() -> usize {
    20
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. config.toml (base configuration)
    /// 2. config.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (TRACEMINE_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("TRACEMINE_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TRACEMINE_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mining: MiningConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MiningConfig {
    fn default() -> Self {
        MiningConfig {
            max_fan_out: default_max_fan_out(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            direct_follows_min: 0,
            dependency_measure_min: 0.0,
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
