use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// `bugzap_crash_report_{millis}.json`
pub fn report_filename(timestamp_millis: i64) -> String {
    format!("bugzap_crash_report_{timestamp_millis}.json")
}

/// Saves analysis reports into one directory, replacing files atomically.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `contents` to `{dir}/{filename}` through a temp file and rename.
    pub fn save(&self, filename: &str, contents: &str) -> Result<PathBuf, ReportError> {
        self.ensure_dir()?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| ReportError::Io(e.error))?;
        Ok(target)
    }

    fn ensure_dir(&self) -> Result<(), ReportError> {
        if self.dir.exists() {
            let meta = fs::metadata(&self.dir).map_err(|e| ReportError::OutputDir(e.to_string()))?;
            if !meta.is_dir() {
                return Err(ReportError::OutputDir(format!(
                    "{} is not a directory",
                    self.dir.display()
                )));
            }
            return Ok(());
        }
        fs::create_dir_all(&self.dir).map_err(|e| ReportError::OutputDir(e.to_string()))
    }
}
