//! Per-device log directories
//!
//! Each (script, device) pair gets `<script>/log/<device>/` under the working
//! directory. Paths handed to the runner stay relative to the working directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Log directory manager rooted at the working directory
#[derive(Clone, Debug)]
pub struct LogDirs {
    root: PathBuf,
}

impl LogDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Log tree of a script, relative to the working directory
    pub fn script_log_root(script: &str) -> PathBuf {
        Path::new(script).join("log")
    }

    /// Relative log directory of a device, without touching the filesystem
    pub fn relative_dir(script: &str, device: &str) -> PathBuf {
        Self::script_log_root(script).join(sanitize_device_id(device))
    }

    /// Log directory for a device, created with parents if absent.
    ///
    /// Returns the path relative to the working directory.
    pub fn log_dir_for(&self, script: &str, device: &str) -> Result<PathBuf> {
        let relative = Self::relative_dir(script, device);
        let absolute = self.root.join(&relative);
        fs::create_dir_all(&absolute)
            .with_context(|| format!("Failed to create log directory: {}", absolute.display()))?;
        debug!("Log directory for {} is {}", device, relative.display());
        Ok(relative)
    }

    /// Resolve a path relative to the working directory
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Recursively delete a script's log tree; no-op when it does not exist
    pub fn clear_logs(&self, script: &str) -> Result<()> {
        let log_root = self.root.join(Self::script_log_root(script));
        if log_root.exists() {
            fs::remove_dir_all(&log_root)
                .with_context(|| format!("Failed to clear logs: {}", log_root.display()))?;
            info!("Cleared log directory {}", log_root.display());
        }
        Ok(())
    }
}

/// Replace every character that is unsafe in a path segment with `_`.
///
/// Network device serials such as `192.168.1.5:5555` become `192_168_1_5_5555`.
pub fn sanitize_device_id(device: &str) -> String {
    device
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
