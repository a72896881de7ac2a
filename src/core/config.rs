//! Configuration management for segref.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{Result, SegrefError};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What a handle does when releases outnumber acquires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeCountPolicy {
    /// Log and count the anomaly, keep the negative value visible
    #[default]
    Observe,
    /// Log and count the anomaly, then reset the count to zero
    Clamp,
}

impl FromStr for NegativeCountPolicy {
    type Err = SegrefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observe" => Ok(Self::Observe),
            "clamp" => Ok(Self::Clamp),
            other => Err(SegrefError::ConfigError(format!(
                "Unknown negative count policy '{other}' (expected 'observe' or 'clamp')"
            ))),
        }
    }
}

impl fmt::Display for NegativeCountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observe => f.write_str("observe"),
            Self::Clamp => f.write_str("clamp"),
        }
    }
}

/// Handle registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Reaction to unmatched releases
    #[serde(default)]
    pub negative_count_policy: NegativeCountPolicy,

    /// Keep closed handles listed until pruned explicitly
    #[serde(default = "default_retain_closed")]
    pub retain_closed: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Tantivy index directory used when none is given
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "segref=debug"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_retain_closed() -> bool {
    true
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            negative_count_policy: NegativeCountPolicy::default(),
            retain_closed: default_retain_closed(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SegrefError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. SEGREF_CONFIG env var
    /// 2. XDG config file (~/.config/segref/config.toml)
    /// 3. ./segref.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("SEGREF_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("segref.toml").exists() {
                Self::from_file("segref.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    ///
    /// Unparseable booleans are ignored; an unknown policy name is an error.
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(policy) = env::var("SEGREF_NEGATIVE_COUNT_POLICY") {
            self.registry.negative_count_policy = policy.parse()?;
        }
        if let Ok(retain) = env::var("SEGREF_RETAIN_CLOSED") {
            if let Ok(r) = retain.parse() {
                self.registry.retain_closed = r;
            }
        }

        if let Ok(index_dir) = env::var("SEGREF_INDEX_DIR") {
            self.storage.index_dir = PathBuf::from(index_dir);
        }

        if let Ok(level) = env::var("SEGREF_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = env::var("SEGREF_LOG_JSON") {
            if let Ok(j) = json.parse() {
                self.logging.json = j;
            }
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.index_dir.as_os_str().is_empty() {
            return Err(SegrefError::ConfigError(
                "Index directory must not be empty".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(SegrefError::ConfigError(
                "Log level must not be empty".to_string(),
            ));
        }

        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.level) {
            return Err(SegrefError::ConfigError(format!(
                "Invalid log level '{}': {e}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Negative count policy: {}",
            self.registry.negative_count_policy
        );
        tracing::info!("  Retain closed handles: {}", self.registry.retain_closed);
        tracing::info!("  Index dir: {:?}", self.storage.index_dir);
        tracing::info!("  Log level: {}", self.logging.level);
        tracing::info!("  JSON logs: {}", self.logging.json);
    }
}
