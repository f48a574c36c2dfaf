//! Write-temp-rename replacement of whole files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{LogError, LogResult};

/// Replaces a file's contents so readers see either the old or the new file.
///
/// Content is written to a uniquely named sibling and renamed over the
/// target on [`commit`](Self::commit). Dropping an uncommitted writer
/// removes the temporary file.
pub struct AtomicFileWriter {
    target_path: PathBuf,
    temp_path: PathBuf,
    file: Option<fs::File>,
}

impl AtomicFileWriter {
    /// Open a temporary sibling of `target_path` for writing.
    pub fn create(target_path: &Path) -> LogResult<Self> {
        let temp_path = Self::generate_temp_path(target_path)?;
        let file = fs::File::create(&temp_path).map_err(|e| LogError::io(&temp_path, e))?;

        Ok(AtomicFileWriter {
            target_path: target_path.to_path_buf(),
            temp_path,
            file: Some(file),
        })
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> LogResult<()> {
        match self.file.as_mut() {
            Some(file) => file
                .write_all(bytes)
                .map_err(|e| LogError::io(&self.temp_path, e)),
            None => Err(LogError::io(
                &self.temp_path,
                std::io::Error::new(std::io::ErrorKind::Other, "writer already committed"),
            )),
        }
    }

    /// Flush, close, and rename the temporary file over the target.
    pub fn commit(mut self) -> LogResult<()> {
        let result = self.finish();
        if result.is_err() {
            let _ = fs::remove_file(&self.temp_path);
        }
        result
    }

    fn finish(&mut self) -> LogResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| LogError::io(&self.temp_path, e))?;
            file.sync_all()
                .map_err(|e| LogError::io(&self.temp_path, e))?;
        }
        fs::rename(&self.temp_path, &self.target_path)
            .map_err(|e| LogError::io(&self.target_path, e))
    }

    fn generate_temp_path(target: &Path) -> LogResult<PathBuf> {
        let invalid = || {
            LogError::io(
                target,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "target has no file name"),
            )
        };
        let parent = target.parent().ok_or_else(invalid)?;
        let filename = target.file_name().ok_or_else(invalid)?;

        let temp_name = format!(
            ".{}.tmp.{}",
            filename.to_string_lossy(),
            Uuid::new_v4().simple()
        );

        Ok(parent.join(temp_name))
    }
}

impl Drop for AtomicFileWriter {
    fn drop(&mut self) {
        // Uncommitted: discard the partial file.
        if self.file.take().is_some() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
