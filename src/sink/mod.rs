//! JSON Lines files under one output directory.
//!
//! Two files per task:
//!
//! - `{task}-metrics.jsonl` is an append-only log with one line per logging
//!   call, `{"step": n, ...metrics}`.
//! - `{task}-{step:06}.jsonl` is a snapshot of up to N example records for
//!   one step, replaced in full whenever that step is logged again.

pub mod atomic;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::error::{LogError, LogResult};

pub use self::atomic::AtomicFileWriter;

/// How many example records to write per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultLimit {
    /// Every available record.
    #[default]
    All,
    /// No record file at all.
    Disabled,
    /// The first `n` records.
    First(usize),
}

impl ResultLimit {
    /// Interpret a `write_n_results` setting: unset or negative means all,
    /// zero disables record files, positive caps the count.
    pub fn from_setting(setting: Option<i64>) -> Self {
        match setting {
            None => Self::All,
            Some(n) if n < 0 => Self::All,
            Some(0) => Self::Disabled,
            Some(n) => Self::First(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Number of records to keep out of `available`.
    pub fn take(&self, available: usize) -> usize {
        match self {
            Self::All => available,
            Self::Disabled => 0,
            Self::First(n) => available.min(*n),
        }
    }
}

impl From<Option<i64>> for ResultLimit {
    fn from(setting: Option<i64>) -> Self {
        Self::from_setting(setting)
    }
}

impl From<i64> for ResultLimit {
    fn from(setting: i64) -> Self {
        Self::from_setting(Some(setting))
    }
}

/// Owns the output directory of one logger.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    /// No filesystem access happens until the first write.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn metrics_path(&self, task_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}-metrics.jsonl", task_name))
    }

    pub fn records_path(&self, task_name: &str, step: u64) -> PathBuf {
        self.output_dir.join(format!("{}-{:06}.jsonl", task_name, step))
    }

    fn ensure_output_dir(&self) -> LogResult<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| LogError::io(&self.output_dir, e))
    }

    /// Append `{"step": step, ...metrics}` as one line.
    ///
    /// The line goes out in a single write on an append-mode handle, so
    /// concurrent appenders never interleave partial lines.
    pub fn append_metrics(
        &self,
        task_name: &str,
        step: u64,
        metrics: &Map<String, Json>,
    ) -> LogResult<()> {
        self.ensure_output_dir()?;
        let path = self.metrics_path(task_name);

        // A metric named "step" overrides the step value in place.
        let mut object = Map::with_capacity(metrics.len() + 1);
        object.insert("step".to_string(), Json::from(step));
        object.extend(metrics.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut line = serde_json::to_string(&object)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LogError::io(&path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| LogError::io(&path, e))?;
        file.flush().map_err(|e| LogError::io(&path, e))?;

        debug!(path = %path.display(), step, metrics = metrics.len(), "appended metrics");
        Ok(())
    }

    /// Replace the step's record file with up to `limit` records.
    ///
    /// Returns the number of lines written; nothing is written when the
    /// limit is [`ResultLimit::Disabled`].
    pub fn write_records(
        &self,
        task_name: &str,
        step: u64,
        records: &[Map<String, Json>],
        limit: ResultLimit,
    ) -> LogResult<usize> {
        if limit.is_disabled() {
            return Ok(0);
        }
        self.ensure_output_dir()?;
        let path = self.records_path(task_name, step);

        let count = limit.take(records.len());
        let mut writer = AtomicFileWriter::create(&path)?;
        for record in &records[..count] {
            let mut line = serde_json::to_vec(record)?;
            line.push(b'\n');
            writer.write_all(&line)?;
        }
        writer.commit()?;

        debug!(path = %path.display(), step, records = count, "wrote records");
        Ok(count)
    }
}
