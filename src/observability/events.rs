//! Named scalar events over evaluation steps, for dashboards.

use crate::error::LogResult;

/// Prefix applied to metric names when emitted as events.
pub const EVAL_TAG_PREFIX: &str = "eval";

/// Event tag for a metric, e.g. `eval/accuracy`.
pub fn eval_tag(metric_name: &str) -> String {
    format!("{}/{}", EVAL_TAG_PREFIX, metric_name)
}

/// Receives `(tag, value, step)` scalars and persists them.
pub trait EventEmitter: Send {
    fn emit_scalar(&mut self, tag: &str, value: f64, step: u64) -> LogResult<()>;

    /// Make everything emitted so far durable.
    fn flush(&mut self) -> LogResult<()> {
        Ok(())
    }
}

#[cfg(feature = "events")]
mod file {
    use std::fs::{self, File, OpenOptions};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    use chrono::Utc;
    use serde::Serialize;
    use tracing::warn;

    use super::{eval_tag, EventEmitter};
    use crate::error::{LogError, LogResult};
    use crate::metrics::scalar_metrics;
    use crate::observability::{LogCall, Logger};

    /// One line of an event file.
    #[derive(Serialize)]
    struct ScalarEvent<'a> {
        wall_time: f64,
        step: u64,
        tag: &'a str,
        value: f64,
    }

    /// Appends scalar events as JSON lines to a single file.
    pub struct EventFileWriter {
        path: PathBuf,
        writer: BufWriter<File>,
    }

    impl EventFileWriter {
        /// Open or create the event file, creating parent directories.
        pub fn open(path: impl Into<PathBuf>) -> LogResult<Self> {
            let path = path.into();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| LogError::io(parent, e))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| LogError::io(&path, e))?;
            Ok(Self {
                path,
                writer: BufWriter::new(file),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl EventEmitter for EventFileWriter {
        fn emit_scalar(&mut self, tag: &str, value: f64, step: u64) -> LogResult<()> {
            if !value.is_finite() {
                warn!(tag, "skipping non-finite scalar event");
                return Ok(());
            }
            let event = ScalarEvent {
                wall_time: Utc::now().timestamp_micros() as f64 / 1e6,
                step,
                tag,
                value,
            };
            let line = serde_json::to_string(&event)?;
            writeln!(self.writer, "{line}").map_err(|e| LogError::io(&self.path, e))
        }

        fn flush(&mut self) -> LogResult<()> {
            self.writer.flush().map_err(|e| LogError::io(&self.path, e))
        }
    }

    /// Writes finite scalar metrics to `{output_dir}/{task}/events.jsonl`.
    ///
    /// Each call opens the task's file, appends, and closes it again, so no
    /// handles are held between calls however many tasks are logged.
    pub struct ScalarEventLogger {
        output_dir: PathBuf,
    }

    impl ScalarEventLogger {
        pub fn new(output_dir: impl Into<PathBuf>) -> Self {
            Self {
                output_dir: output_dir.into(),
            }
        }

        pub fn events_path(&self, task_name: &str) -> PathBuf {
            self.output_dir.join(task_name).join("events.jsonl")
        }
    }

    impl Logger for ScalarEventLogger {
        fn output_dir(&self) -> &Path {
            &self.output_dir
        }

        fn log(&mut self, call: &LogCall<'_>) -> LogResult<()> {
            let mut writer = EventFileWriter::open(self.events_path(call.task_name))?;
            for (name, value) in scalar_metrics(call.metrics) {
                writer.emit_scalar(&eval_tag(name), value, call.step)?;
            }
            writer.flush()
        }
    }
}

#[cfg(feature = "events")]
pub use self::file::{EventFileWriter, ScalarEventLogger};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_tag() {
        assert_eq!(eval_tag("rouge1"), "eval/rouge1");
    }

    #[cfg(feature = "events")]
    #[test]
    fn test_event_file_writer_lines() {
        use serde_json::Value as Json;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task").join("events.jsonl");
        let mut writer = EventFileWriter::open(&path).unwrap();
        writer.emit_scalar("eval/rouge1", 50.0, 1).unwrap();
        writer.emit_scalar("eval/nan", f64::NAN, 1).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<Json> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["tag"], "eval/rouge1");
        assert_eq!(lines[0]["step"], 1);
        assert_eq!(lines[0]["value"], 50.0);
        assert!(lines[0]["wall_time"].as_f64().unwrap() > 0.0);
    }

    #[cfg(feature = "events")]
    #[test]
    fn test_scalar_event_logger_reopens_per_call() {
        use crate::metrics::{Metric, MetricMap};
        use crate::observability::{LogCall, Logger};

        let dir = tempfile::tempdir().unwrap();
        let mut logger = ScalarEventLogger::new(dir.path());
        let mut metrics = MetricMap::new();
        metrics.insert("accuracy".to_string(), Metric::scalar(0.5));

        logger.log(&LogCall::new("mnli", 1, &metrics)).unwrap();
        let path = logger.events_path("mnli");
        std::fs::remove_file(&path).unwrap();

        // A held handle would keep writing to the unlinked file.
        logger.log(&LogCall::new("mnli", 2, &metrics)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"step\":2"));
    }
}
