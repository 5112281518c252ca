//! Configuration management for gymwatch
//!
//! Configuration comes from an optional YAML file with CLI overrides
//! layered on top. Everything has a sensible default, so running with
//! no config file at all is the normal case.

use crate::cli::Cli;
use crate::error::{GymwatchError, Result};
use crate::model::Difficulty;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure for gymwatch
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage location settings
    pub storage: StorageConfig,

    /// Defaults applied when logging sets
    pub sets: SetsConfig,
}

/// Storage location settings
///
/// Precedence for the database path: CLI `--db` flag, then the
/// `GYMWATCH_DB` environment variable (read by the store itself),
/// then this config value, then the platform data directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path override
    pub path: Option<PathBuf>,
}

/// Defaults applied when logging sets
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SetsConfig {
    /// Difficulty assumed when a `--set` spec omits one
    pub default_difficulty: Difficulty,
}

impl Config {
    /// Load configuration from a YAML file and apply CLI overrides
    ///
    /// A missing file is not an error; defaults are used and the CLI
    /// overrides still apply.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let raw = std::fs::read_to_string(path).map_err(GymwatchError::Io)?;
            serde_yaml::from_str(&raw).map_err(GymwatchError::Yaml)?
        } else {
            debug!("No config file at {}, using defaults", path);
            Self::default()
        };

        if let Some(db) = &cli.db {
            config.storage.path = Some(PathBuf::from(db));
        }

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `GymwatchError::Config` if a configured value is unusable.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(GymwatchError::Config("storage.path must not be empty".into()).into());
            }
        }
        Ok(())
    }
}
