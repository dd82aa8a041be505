//! Per-device report generation
//!
//! Turns a device's raw run log into an HTML report with the runner's
//! `report` subcommand.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::executor::LogDirs;
use crate::models::DeviceResult;

/// Raw log written by the runner's `run` subcommand
pub const RAW_LOG_FILE: &str = "log.txt";

/// HTML report written into each device's log directory
pub const REPORT_FILE: &str = "log.html";

/// Builds per-device HTML reports
pub struct ReportBuilder {
    runner: String,
    lang: String,
    logs: LogDirs,
}

impl ReportBuilder {
    pub fn new(runner: impl Into<String>, lang: impl Into<String>, logs: LogDirs) -> Self {
        Self {
            runner: runner.into(),
            lang: lang.into(),
            logs,
        }
    }

    /// Arguments of the runner's `report` subcommand
    pub fn report_args(script: &str, log_dir: &Path, outfile: &Path, lang: &str) -> Vec<String> {
        vec![
            "report".to_string(),
            script.to_string(),
            "--log_root".to_string(),
            log_dir.to_string_lossy().to_string(),
            "--outfile".to_string(),
            outfile.to_string_lossy().to_string(),
            "--lang".to_string(),
            lang.to_string(),
        ]
    }

    /// Build the report for one device.
    ///
    /// Never fails: a missing raw log or any internal error yields a
    /// `status == -1` result with an empty path.
    pub async fn build_device_report(&self, script: &str, device: &str) -> DeviceResult {
        match self.try_build(script, device).await {
            Ok(Some(result)) => result,
            Ok(None) => DeviceResult::failure(device),
            Err(e) => {
                error!("Report build for {} failed: {:?}", device, e);
                DeviceResult::failure(device)
            }
        }
    }

    async fn try_build(&self, script: &str, device: &str) -> Result<Option<DeviceResult>> {
        let log_dir = self.logs.log_dir_for(script, device)?;
        let raw_log = self.logs.resolve(&log_dir.join(RAW_LOG_FILE));

        if !raw_log.is_file() {
            warn!(
                "Report build failed for {}: file not found {}",
                device,
                raw_log.display()
            );
            return Ok(None);
        }

        let outfile = log_dir.join(REPORT_FILE);
        let args = Self::report_args(script, &log_dir, &outfile, &self.lang);
        debug!("Executing {} {}", self.runner, args.join(" "));

        let status = Command::new(&self.runner)
            .args(&args)
            .current_dir(self.logs.root())
            .status()
            .await
            .with_context(|| format!("Failed to execute {} report", self.runner))?;

        let code = status.code().unwrap_or(-1);
        if code != 0 {
            warn!("Report for {} exited with status {}", device, code);
        }

        Ok(Some(DeviceResult::report(
            code,
            outfile.to_string_lossy().to_string(),
        )))
    }
}
