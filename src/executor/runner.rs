//! Multi-device run orchestration
//!
//! Loads progress, launches every pending device at once, folds each device's
//! report into the record as its task is drained, then renders the summary.

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

use super::{LogDirs, TaskLauncher};
use crate::config::{AppConfig, DrainOrder};
use crate::models::{RunRecord, Task, FAILURE_STATUS};
use crate::results::{ProgressStore, ReportBuilder, SummaryBuilder};
use crate::utils::BrowserOpener;

/// Runs one script across a set of devices
pub struct FleetRunner {
    store: ProgressStore,
    launcher: TaskLauncher,
    reports: ReportBuilder,
    summary: SummaryBuilder,
    drain: DrainOrder,
}

impl FleetRunner {
    /// Create a runner working in `root` (normally the current directory)
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        let root = root.into();
        let logs = LogDirs::new(&root);

        let mut summary = SummaryBuilder::new(&root, &config.template, &config.summary_output);
        if config.open_browser {
            summary = summary.with_opener(BrowserOpener::new(config.browser.clone()));
        }

        Self {
            store: ProgressStore::new(logs.clone(), &config.progress_file),
            launcher: TaskLauncher::new(&config.runner, logs.clone()),
            reports: ReportBuilder::new(&config.runner, &config.report_lang, logs),
            summary,
            drain: config.drain,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Run `script` on `devices`.
    ///
    /// Resumes from stored progress unless `force_full_run` is set. The record
    /// is saved after every device. Summary failures are logged, not returned.
    pub async fn run(
        &self,
        devices: &[String],
        script: &str,
        force_full_run: bool,
    ) -> Result<RunRecord> {
        let started = Instant::now();
        let mut record = self.store.load(script, force_full_run)?;

        if devices.is_empty() {
            warn!("No devices to run {} on", script);
        }

        let tasks = self.launcher.launch(devices, script, &record, force_full_run);
        info!(
            "Waiting on {} task(s) in {} order",
            tasks.len(),
            self.drain
        );

        match self.drain {
            DrainOrder::Launch => {
                for mut task in tasks {
                    let status = wait_exit_code(&mut task).await;
                    self.finish(&mut record, task, status).await?;
                }
            }
            DrainOrder::Completion => {
                let mut pending: FuturesUnordered<_> = tasks
                    .into_iter()
                    .map(|mut task| async move {
                        let status = wait_exit_code(&mut task).await;
                        (task, status)
                    })
                    .collect();

                while let Some((task, status)) = pending.next().await {
                    self.finish(&mut record, task, status).await?;
                }
            }
        }

        info!(
            "All devices finished in {}ms: {}/{} passed",
            started.elapsed().as_millis(),
            record.success_count(),
            record.count()
        );

        if let Err(e) = self.summary.build_summary(&record).await {
            error!("Summary report failed: {:?}", e);
        }

        Ok(record)
    }

    /// Build the device's report, merge it and persist the record
    async fn finish(&self, record: &mut RunRecord, task: Task, status: i32) -> Result<()> {
        if status != 0 {
            warn!("{} exited with status {}", task, status);
        }

        let result = self
            .reports
            .build_device_report(&task.script, &task.device)
            .await
            .with_run_status(status);
        info!("{}: {}", task.device, result);

        record.record(task.device, result);
        self.store.save(record)?;
        Ok(())
    }
}

async fn wait_exit_code(task: &mut Task) -> i32 {
    match task.wait().await {
        Ok(code) => code,
        Err(e) => {
            error!("Failed waiting on {}: {}", task, e);
            FAILURE_STATUS
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::DeviceResult;
    use crate::results::write_default_template;
    use crate::utils::testing::{launched_devices, write_stub_runner};
    use std::path::Path;
    use tempfile::tempdir;

    fn config(runner: &Path, drain: DrainOrder) -> AppConfig {
        AppConfig {
            runner: runner.to_string_lossy().to_string(),
            open_browser: false,
            drain,
            ..Default::default()
        }
    }

    fn devices(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_full_run_two_devices() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());
        write_default_template(dir.path(), "report_tpl.html", false).unwrap();

        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));
        let record = fleet.run(&devices(&["A", "B"]), "demo.air", true).await.unwrap();

        assert_eq!(record.tests["A"].status, 0);
        assert_eq!(record.tests["B"].status, 0);
        assert_eq!(record.tests["A"].path, "demo.air/log/A/log.html");

        let stored = fleet.store().read().unwrap();
        assert_eq!(stored.tests["A"].status, 0);
        assert_eq!(stored.tests["B"].status, 0);
        assert_eq!(stored.success_count(), 2);
        assert_eq!(stored.count(), 2);

        let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
        assert!(html.contains("2 / 2"));
    }

    #[tokio::test]
    async fn test_missing_log_counts_as_failure() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());

        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));
        let record = fleet
            .run(&devices(&["NOLOG-A", "B"]), "demo.air", true)
            .await
            .unwrap();

        let failed = &record.tests["NOLOG-A"];
        assert_eq!(failed.status, -1);
        assert_eq!(failed.path, "");
        assert_eq!(record.success_count(), 1);
        assert_eq!(record.count(), 2);
    }

    #[tokio::test]
    async fn test_runner_exit_code_is_recorded() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());

        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));
        let record = fleet.run(&devices(&["FAIL-A"]), "demo.air", true).await.unwrap();

        let result = &record.tests["FAIL-A"];
        assert_eq!(result.status, 3);
        assert_eq!(result.report_status, Some(0));
        assert!(!result.path.is_empty());
    }

    #[tokio::test]
    async fn test_resume_skips_passed_devices() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());
        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));

        let mut seeded = RunRecord::new("demo.air");
        seeded.record("A", DeviceResult::report(0, "kept.html"));
        seeded.record("B", DeviceResult::report(0, "b.html").with_run_status(1));
        fleet.store().save(&seeded).unwrap();

        let record = fleet
            .run(&devices(&["A", "B", "C"]), "demo.air", false)
            .await
            .unwrap();

        let mut launched = launched_devices(dir.path());
        launched.sort();
        assert_eq!(launched, vec!["B", "C"]);
        assert_eq!(record.tests["A"].path, "kept.html");
        assert_eq!(record.tests["B"].status, 0);
        assert_eq!(record.tests["C"].status, 0);
    }

    #[tokio::test]
    async fn test_full_run_clears_logs_and_relaunches() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());
        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));

        let mut seeded = RunRecord::new("demo.air");
        seeded.record("A", DeviceResult::report(0, "old.html"));
        fleet.store().save(&seeded).unwrap();
        let stale = dir.path().join("demo.air/log/stale");
        std::fs::create_dir_all(&stale).unwrap();

        let record = fleet.run(&devices(&["A"]), "demo.air", true).await.unwrap();

        assert!(!stale.exists());
        assert_eq!(launched_devices(dir.path()), vec!["A"]);
        assert_eq!(record.tests["A"].path, "demo.air/log/A/log.html");
    }

    #[tokio::test]
    async fn test_summary_failure_keeps_progress() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());
        // no report_tpl.html in the working directory

        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));
        let record = fleet.run(&devices(&["A", "B"]), "demo.air", true).await.unwrap();

        assert!(!dir.path().join("report.html").exists());
        let stored = fleet.store().read().unwrap();
        assert_eq!(stored.tests, record.tests);
        assert_eq!(stored.count(), 2);
    }

    #[tokio::test]
    async fn test_completion_order_drain() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());
        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Completion));

        let record = fleet
            .run(&devices(&["SLOW-A", "B", "C"]), "demo.air", true)
            .await
            .unwrap();

        assert_eq!(record.count(), 3);
        assert_eq!(record.success_count(), 3);
        assert_eq!(fleet.store().read().unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_progress_aborts_run() {
        let dir = tempdir().unwrap();
        let runner = write_stub_runner(dir.path());
        let fleet = FleetRunner::new(dir.path(), &config(&runner, DrainOrder::Launch));
        std::fs::write(fleet.store().path(), "[1, 2").unwrap();

        assert!(fleet.run(&devices(&["A"]), "demo.air", false).await.is_err());
        assert!(launched_devices(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_runner_leaves_devices_out() {
        let dir = tempdir().unwrap();
        let fleet = FleetRunner::new(
            dir.path(),
            &config(Path::new("/nonexistent/airtest"), DrainOrder::Launch),
        );

        let record = fleet.run(&devices(&["A", "B"]), "demo.air", true).await.unwrap();
        assert!(record.tests.is_empty());
    }
}
