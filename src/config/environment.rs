//! Environment variable overrides for logging configuration.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use super::config::LoggingConfig;

/// Default prefix of the override variables.
pub const DEFAULT_PREFIX: &str = "EVALLOG";

/// Loads environment variables from a .env file and the process environment.
///
/// Recognized variables, for prefix `EVALLOG`:
/// * `EVALLOG_OUTPUT_DIR` - overrides `logging.output_dir`
/// * `EVALLOG_WRITE_N_RESULTS` - overrides `logging.write_n_results`
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<PathBuf>,
    prefix: String,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Only loaded when given explicitly.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!("Failed to load .env file {}: {}", path.display(), e);
                }
            }
        }

        Self {
            env_file: env_file.map(Path::to_path_buf),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Read variables under a different prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    fn var(&self, name: &str) -> Option<String> {
        env::var(format!("{}_{}", self.prefix, name))
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.var("OUTPUT_DIR").map(PathBuf::from)
    }

    pub fn write_n_results(&self) -> Result<Option<i64>> {
        self.var("WRITE_N_RESULTS")
            .map(|raw| {
                raw.trim().parse::<i64>().with_context(|| {
                    format!(
                        "{}_WRITE_N_RESULTS must be an integer, got {:?}",
                        self.prefix, raw
                    )
                })
            })
            .transpose()
    }

    /// Overlay any set variables onto `logging`.
    pub fn apply(&self, logging: &mut LoggingConfig) -> Result<()> {
        if let Some(dir) = self.output_dir() {
            logging.output_dir = dir;
        }
        if let Some(n) = self.write_n_results()? {
            logging.write_n_results = Some(n);
        }
        Ok(())
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
