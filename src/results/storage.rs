//! Progress storage
//!
//! Persists the run record as a single pretty-printed JSON file in the
//! working directory, rewritten in full after every device.

use serde_json::Error as JsonError;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::executor::LogDirs;
use crate::models::{now_epoch_secs, RunRecord};

/// Progress file errors
#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Failed to read progress file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Corrupt progress file {path}: {source}")]
    Corrupt { path: PathBuf, source: JsonError },

    #[error("Failed to write progress file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize progress: {0}")]
    Serialize(#[source] JsonError),

    #[error("Failed to clear logs before a fresh run: {0}")]
    ClearLogs(#[source] anyhow::Error),
}

/// Progress file manager
pub struct ProgressStore {
    path: PathBuf,
    logs: LogDirs,
}

impl ProgressStore {
    /// Create a store for `file_name` inside the log manager's working directory
    pub fn new(logs: LogDirs, file_name: &str) -> Self {
        Self {
            path: logs.root().join(file_name),
            logs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load progress for a run.
    ///
    /// Resumes from the existing file unless `force_full_run` is set or no file
    /// exists, in which case the script's logs are cleared and a fresh record
    /// is returned. `start` is always reset to now.
    pub fn load(&self, script: &str, force_full_run: bool) -> Result<RunRecord, ProgressError> {
        if !force_full_run && self.exists() {
            let mut record = self.read()?;
            record.start = now_epoch_secs();
            info!(
                "Resuming from {} ({} recorded devices)",
                self.path.display(),
                record.count()
            );
            return Ok(record);
        }

        self.logs
            .clear_logs(script)
            .map_err(ProgressError::ClearLogs)?;
        info!("Starting a fresh run for {}", script);
        Ok(RunRecord::new(script))
    }

    /// Read the stored record as-is
    pub fn read(&self) -> Result<RunRecord, ProgressError> {
        let file = File::open(&self.path).map_err(|source| ProgressError::Read {
            path: self.path.clone(),
            source,
        })?;
        let record: RunRecord =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                ProgressError::Corrupt {
                    path: self.path.clone(),
                    source,
                }
            })?;

        debug!("Loaded progress from {}", self.path.display());
        Ok(record)
    }

    /// Overwrite the progress file with `record`.
    ///
    /// Writes a sibling temp file and renames it over the target.
    pub fn save(&self, record: &RunRecord) -> Result<(), ProgressError> {
        let tmp_path = self.path.with_extension("json.tmp");
        let write_err = |source| ProgressError::Write {
            path: self.path.clone(),
            source,
        };

        let file = File::create(&tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(ProgressError::Serialize)?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        fs::rename(&tmp_path, &self.path).map_err(write_err)?;

        debug!(
            "Saved progress ({} devices) to {}",
            record.count(),
            self.path.display()
        );
        Ok(())
    }
}
