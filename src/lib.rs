//! Evaluation Logging Kit - persist evaluation metrics and inference records
//!
//! evallog turns whatever an evaluation loop produces (metrics, dataset
//! examples, predictions, scores, targets) into JSON Lines files, dropping
//! values it cannot represent instead of failing the run:
//!
//! - **`value`** - untyped values and their ordered JSON coercion strategies
//! - **`metrics`** - typed metrics and their JSON rendering
//! - **`record`** - per-example records zipped from examples and outputs
//! - **`sink`** - append-only metrics files and per-step record snapshots
//! - **`observability`** - the `Logger` trait, `JsonLogger`, and event emission
//! - **`config`** - TOML and environment configuration
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! evallog = { version = "0.1", default-features = false }
//! # Or enable everything:
//! evallog = { version = "0.1", features = ["all"] }
//! ```
//!
//! - `config` (default) - [`config`] module, TOML and `.env` loading
//! - `events` (default) - file-backed scalar event emission
//!
//! # Example
//!
//! ```no_run
//! use evallog::prelude::*;
//!
//! let mut logger = JsonLogger::new("/tmp/eval").with_write_n_results(10);
//!
//! let mut metrics = MetricMap::new();
//! metrics.insert("accuracy".to_string(), Metric::scalar(100));
//!
//! let examples = vec![
//!     Example::new().with("inputs_pretokenized", "i0"),
//!     Example::new().with("inputs_pretokenized", "i1"),
//! ];
//! let inferences = Inferences::new()
//!     .with_predictions(vec!["pred0", "pred1"])
//!     .with_scores(vec![0.2, 0.3]);
//! let targets = vec![Value::from("target0"), Value::from("target1")];
//!
//! logger
//!     .log(
//!         &LogCall::new("test", 42, &metrics)
//!             .examples(&examples)
//!             .inferences(&inferences)
//!             .targets(&targets),
//!     )
//!     .unwrap();
//! ```

#![warn(missing_docs)]

pub mod error;

/// Untyped evaluation values and JSON coercion
pub mod value;

/// Typed metrics and their JSON rendering
pub mod metrics;

/// Per-example inference records
pub mod record;

/// JSON Lines output files
pub mod sink;

/// Loggers and event emission
pub mod observability;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

pub use error::{LogError, LogResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{LogError, LogResult};
    pub use crate::metrics::{Metric, MetricMap};
    pub use crate::observability::{EventEmitter, JsonLogger, LogCall, Logger, LoggerSet};
    pub use crate::record::Inferences;
    pub use crate::sink::ResultLimit;
    pub use crate::value::{ArrayData, Example, NdArray, Value};

    #[cfg(feature = "events")]
    pub use crate::observability::{EventFileWriter, ScalarEventLogger};

    #[cfg(feature = "config")]
    pub use crate::config::{ConfigurationLoader, EnvironmentLoader, LoggingConfig};
}
