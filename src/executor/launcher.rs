//! Device task launcher
//!
//! Starts one runner subprocess per device without waiting on any of them.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::LogDirs;
use crate::models::{RunRecord, Task};

/// Prefix the runner expects in front of an Android device serial
const DEVICE_URI_PREFIX: &str = "Android:///";

/// Launch errors for a single device
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to prepare log directory for {device}: {source}")]
    LogDir {
        device: String,
        source: anyhow::Error,
    },

    #[error("Failed to start {program} for {device}: {source}")]
    Spawn {
        program: String,
        device: String,
        source: std::io::Error,
    },
}

/// Launches runner subprocesses for devices
pub struct TaskLauncher {
    runner: String,
    logs: LogDirs,
}

impl TaskLauncher {
    pub fn new(runner: impl Into<String>, logs: LogDirs) -> Self {
        Self {
            runner: runner.into(),
            logs,
        }
    }

    /// Arguments of the runner's `run` subcommand
    pub fn run_args(script: &str, device: &str, log_dir: &Path) -> Vec<String> {
        vec![
            "run".to_string(),
            script.to_string(),
            "--device".to_string(),
            format!("{DEVICE_URI_PREFIX}{device}"),
            "--log".to_string(),
            log_dir.to_string_lossy().to_string(),
        ]
    }

    /// Launch the script on every device that still needs it.
    ///
    /// Devices that already passed are skipped unless `force_full_run` is set.
    /// A device that fails to launch is logged and left out of the returned
    /// tasks; the remaining devices still launch.
    pub fn launch(
        &self,
        devices: &[String],
        script: &str,
        record: &RunRecord,
        force_full_run: bool,
    ) -> Vec<Task> {
        let mut tasks = Vec::new();

        for device in devices {
            if !force_full_run && record.has_passed(device) {
                info!("Skip device {} (already passed)", device);
                continue;
            }

            match self.launch_one(device, script) {
                Ok(task) => {
                    info!("Launched {}", task);
                    tasks.push(task);
                }
                Err(e) => error!("{}", e),
            }
        }

        info!(
            "Launched {} of {} device(s) for {}",
            tasks.len(),
            devices.len(),
            script
        );
        tasks
    }

    fn launch_one(&self, device: &str, script: &str) -> Result<Task, LaunchError> {
        let log_dir: PathBuf =
            self.logs
                .log_dir_for(script, device)
                .map_err(|source| LaunchError::LogDir {
                    device: device.to_string(),
                    source,
                })?;

        let args = Self::run_args(script, device, &log_dir);
        debug!("Executing {} {}", self.runner, args.join(" "));

        let process = Command::new(&self.runner)
            .args(&args)
            .current_dir(self.logs.root())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.runner.clone(),
                device: device.to_string(),
                source,
            })?;

        Ok(Task::new(device, script, process))
    }
}
