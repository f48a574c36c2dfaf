//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::environment::EnvironmentLoader;
use crate::observability::{JsonLogger, LoggerSet};
use crate::sink::ResultLimit;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Evaluation logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory all loggers write under
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Records per step: omitted or negative = all, 0 = no record files
    #[serde(default)]
    pub write_n_results: Option<i64>,
    /// Also write per-task scalar event files
    #[serde(default)]
    pub event_files: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("eval-logs")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            write_n_results: None,
            event_files: false,
        }
    }
}

impl LoggingConfig {
    pub fn result_limit(&self) -> ResultLimit {
        ResultLimit::from_setting(self.write_n_results)
    }

    /// Build the configured loggers, all rooted at `output_dir`.
    pub fn build_loggers(&self) -> LoggerSet {
        #[cfg_attr(not(feature = "events"), allow(unused_mut))]
        let mut loggers = LoggerSet::new()
            .with(JsonLogger::new(&self.output_dir).with_write_n_results(self.result_limit()));

        if self.event_files {
            #[cfg(feature = "events")]
            loggers.push(Box::new(crate::observability::ScalarEventLogger::new(
                &self.output_dir,
            )));
            #[cfg(not(feature = "events"))]
            warn!("event_files is set but the `events` feature is disabled");
        }

        loggers
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    pub config_path: Option<PathBuf>,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses default config.
    ///
    /// Environment overrides (`EVALLOG_*`) are applied on top.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        Self::with_environment(config_path, &EnvironmentLoader::default())
    }

    /// Initialize with an explicit environment source.
    pub fn with_environment(
        config_path: Option<&Path>,
        environment: &EnvironmentLoader,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_config(path)?,
            None => Configuration::default(),
        };

        environment
            .apply(&mut config.logging)
            .context("Failed to apply environment overrides")?;

        Ok(Self {
            config_path: config_path.map(Path::to_path_buf),
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: None,
            config,
        }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Configuration> {
        let config: Configuration = toml::from_str(content)?;
        if config.logging.output_dir.as_os_str().is_empty() {
            warn!("logging.output_dir is empty; files will be written to the working directory");
        }
        Ok(config)
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "logging.output_dir" => Some(self.config.logging.output_dir.display().to_string()),
            "logging.write_n_results" => self.config.logging.write_n_results.map(|n| n.to_string()),
            "logging.event_files" => Some(self.config.logging.event_files.to_string()),
            _ => None,
        }
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }
}
