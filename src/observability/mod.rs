//! Loggers that persist the results of one evaluation call.
//!
//! Every logger receives the same [`LogCall`]: the task, the step, the
//! computed metrics, and the per-example inputs, predictions, scores, and
//! targets. [`JsonLogger`] writes JSON Lines files; [`ScalarEventLogger`]
//! (with the `events` feature) writes per-task scalar event files for
//! dashboards. [`LoggerSet`] fans one call out to several loggers.
//!
//! # Example
//!
//! ```no_run
//! use evallog::metrics::{Metric, MetricMap};
//! use evallog::observability::{JsonLogger, LogCall, Logger};
//! use evallog::record::Inferences;
//! use evallog::value::{Example, Value};
//!
//! let mut logger = JsonLogger::new("/tmp/eval").with_write_n_results(10);
//!
//! let mut metrics = MetricMap::new();
//! metrics.insert("accuracy".to_string(), Metric::scalar(100));
//!
//! let examples = vec![Example::new().with("inputs_pretokenized", "i0")];
//! let inferences = Inferences::new().with_predictions(vec!["pred0"]);
//! let targets = vec![Value::from("target0")];
//!
//! let call = LogCall::new("test", 42, &metrics)
//!     .examples(&examples)
//!     .inferences(&inferences)
//!     .targets(&targets);
//! logger.log(&call).unwrap();
//! ```

pub mod events;
pub mod json;

use std::path::Path;

use crate::error::LogResult;
use crate::metrics::MetricMap;
use crate::record::Inferences;
use crate::value::{Example, Value};

pub use self::events::{eval_tag, EventEmitter};
#[cfg(feature = "events")]
pub use self::events::{EventFileWriter, ScalarEventLogger};
pub use self::json::JsonLogger;

const NO_INFERENCES: &Inferences = &Inferences {
    predictions: None,
    scores: None,
};

/// Everything produced by one evaluation of one task at one step.
#[derive(Debug, Clone, Copy)]
pub struct LogCall<'a> {
    pub task_name: &'a str,
    pub step: u64,
    pub metrics: &'a MetricMap,
    pub examples: &'a [Example],
    pub inferences: &'a Inferences,
    pub targets: &'a [Value],
}

impl<'a> LogCall<'a> {
    /// A call carrying only metrics.
    pub fn new(task_name: &'a str, step: u64, metrics: &'a MetricMap) -> Self {
        Self {
            task_name,
            step,
            metrics,
            examples: &[],
            inferences: NO_INFERENCES,
            targets: &[],
        }
    }

    pub fn examples(mut self, examples: &'a [Example]) -> Self {
        self.examples = examples;
        self
    }

    pub fn inferences(mut self, inferences: &'a Inferences) -> Self {
        self.inferences = inferences;
        self
    }

    pub fn targets(mut self, targets: &'a [Value]) -> Self {
        self.targets = targets;
        self
    }
}

/// A destination for evaluation results.
pub trait Logger: Send {
    /// Directory this logger writes under.
    fn output_dir(&self) -> &Path;

    /// Persist one call. Returns only after all I/O has completed; values
    /// that cannot be represented are skipped, I/O failures are returned.
    fn log(&mut self, call: &LogCall<'_>) -> LogResult<()>;
}

/// Several loggers fed the same calls, in insertion order.
#[derive(Default)]
pub struct LoggerSet {
    loggers: Vec<Box<dyn Logger>>,
}

impl LoggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logger: impl Logger + 'static) -> Self {
        self.push(Box::new(logger));
        self
    }

    pub fn push(&mut self, logger: Box<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    pub fn output_dirs(&self) -> Vec<&Path> {
        self.loggers.iter().map(|l| l.output_dir()).collect()
    }
}

impl Logger for LoggerSet {
    /// Directory of the first logger; empty when the set is empty.
    fn output_dir(&self) -> &Path {
        self.loggers
            .first()
            .map_or(Path::new(""), |l| l.output_dir())
    }

    /// Log to every logger; stops at the first I/O failure.
    fn log(&mut self, call: &LogCall<'_>) -> LogResult<()> {
        for logger in &mut self.loggers {
            logger.log(call)?;
        }
        Ok(())
    }
}
