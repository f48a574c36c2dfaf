//! Error types for the logging sinks

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for logging operations
pub type LogResult<T> = Result<T, LogError>;

/// Fatal errors raised while persisting evaluation artifacts.
///
/// Values that cannot be converted to JSON are not errors at this level;
/// see [`crate::value::Unsupported`].
#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LogError {
    /// Create an IO error bound to the path being written
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
