//! Configuration management for Pawhaven
//!
//! Settings are read from an optional TOML file; every field has a default so
//! the server runs with no config file at all.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file path
pub const CONFIG_PATH_ENV: &str = "PAWHAVEN_CONFIG";

/// Default config file path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "pawhaven.toml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Log rotation and retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory holding the rotated log files (default: "logs")
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Maximum number of historical log files to keep (default: 50)
    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,

    /// Maximum age of a log file in days before it is pruned (default: 30)
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,

    /// Interval between rotation/retention ticks in seconds (default: 3600)
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

/// Authentication settings
///
/// Maps bearer tokens to user ids. This is the development verifier; a real
/// identity-provider client plugs in behind the same `TokenVerifier` seam.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_max_file_count() -> usize {
    50
}

fn default_max_age_days() -> u64 {
    30
}

fn default_tick_interval_secs() -> u64 {
    3600 // one hour
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            max_file_count: default_max_file_count(),
            max_age_days: default_max_age_days(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

impl LoggingConfig {
    /// Maximum file age as a `Duration`
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_days * 24 * 60 * 60)
    }

    /// Tick interval as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

impl Config {
    /// Load configuration from the path named by `PAWHAVEN_CONFIG`, falling
    /// back to `pawhaven.toml`, falling back to defaults if no file exists.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.logging.tick_interval_secs == 0 {
            bail!("logging.tick_interval_secs must be greater than zero");
        }
        if self.logging.directory.as_os_str().is_empty() {
            bail!("logging.directory must not be empty");
        }
        Ok(())
    }
}
