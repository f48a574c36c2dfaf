//! JSON Lines logger for metrics and inference records.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{eval_tag, EventEmitter, LogCall, Logger};
use crate::error::LogResult;
use crate::metrics::{scalar_metrics, serialize_metrics};
use crate::record::{zip_records, RecordSerializer};
use crate::sink::{FileSink, ResultLimit};
use crate::value::ValueCoercer;

/// Writes `{task}-metrics.jsonl` and `{task}-{step:06}.jsonl` under one
/// output directory.
///
/// Each call appends one metrics line, then (unless `write_n_results` is 0)
/// replaces the step's record file with up to `write_n_results` records.
/// When an [`EventEmitter`] is attached, every scalar metric that made it
/// into the metrics line is also emitted as `eval/{name}`.
pub struct JsonLogger {
    sink: FileSink,
    write_n_results: ResultLimit,
    records: RecordSerializer,
    emitter: Option<Box<dyn EventEmitter>>,
}

impl JsonLogger {
    /// Logger writing every record of every call.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            sink: FileSink::new(output_dir),
            write_n_results: ResultLimit::All,
            records: RecordSerializer::new(),
            emitter: None,
        }
    }

    /// Cap records per step: negative means all, 0 means no record file.
    pub fn with_write_n_results(mut self, limit: impl Into<ResultLimit>) -> Self {
        self.write_n_results = limit.into();
        self
    }

    /// Use a coercer with extra strategies for record values.
    pub fn with_coercer(mut self, coercer: ValueCoercer) -> Self {
        self.records = RecordSerializer::with_coercer(coercer);
        self
    }

    pub fn with_event_emitter(mut self, emitter: Box<dyn EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn write_n_results(&self) -> ResultLimit {
        self.write_n_results
    }

    pub fn metrics_path(&self, task_name: &str) -> PathBuf {
        self.sink.metrics_path(task_name)
    }

    pub fn records_path(&self, task_name: &str, step: u64) -> PathBuf {
        self.sink.records_path(task_name, step)
    }
}

impl Logger for JsonLogger {
    fn output_dir(&self) -> &Path {
        self.sink.output_dir()
    }

    fn log(&mut self, call: &LogCall<'_>) -> LogResult<()> {
        let metrics = serialize_metrics(call.metrics);
        self.sink
            .append_metrics(call.task_name, call.step, &metrics)?;

        let written = if self.write_n_results.is_disabled() {
            0
        } else {
            let records = zip_records(
                call.examples,
                call.inferences,
                call.targets,
                self.write_n_results,
            );
            let rendered = self.records.serialize_all(&records);
            self.sink.write_records(
                call.task_name,
                call.step,
                &rendered,
                self.write_n_results,
            )?
        };

        if let Some(emitter) = self.emitter.as_mut() {
            for (name, value) in scalar_metrics(call.metrics) {
                emitter.emit_scalar(&eval_tag(name), value, call.step)?;
            }
            emitter.flush()?;
        }

        debug!(
            task = call.task_name,
            step = call.step,
            metrics = metrics.len(),
            records = written,
            "logged evaluation results"
        );
        Ok(())
    }
}
