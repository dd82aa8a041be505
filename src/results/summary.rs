//! Aggregate summary report
//!
//! Renders every device's result into a single HTML page from a Jinja-style
//! template found in the working directory.

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use minijinja::{context, Environment};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::{now_epoch_secs, DeviceResult, RunRecord};
use crate::utils::BrowserOpener;

/// Template written by `airtest-fleet init`
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report_tpl.html");

/// View of a run record handed to the template as `data`
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    /// Elapsed seconds since the run started, millisecond precision
    pub time: String,
    pub success: usize,
    pub count: usize,
    /// Local start time, `%Y-%m-%d %H:%M:%S`
    pub start: String,
    pub script: String,
    pub tests: BTreeMap<String, DeviceResult>,
}

impl Summary {
    pub fn from_record(record: &RunRecord, now: f64) -> Self {
        let tests = record
            .tests
            .iter()
            .map(|(device, result)| {
                let mut result = result.clone();
                if !result.is_success() && result.device.is_none() {
                    result.device = Some(device.clone());
                }
                (device.clone(), result)
            })
            .collect();

        Self {
            time: format!("{:.3}", now - record.start),
            success: record.success_count(),
            count: record.count(),
            start: format_local(record.start),
            script: record.script.clone(),
            tests,
        }
    }
}

/// Format epoch seconds as a local timestamp
fn format_local(epoch_secs: f64) -> String {
    let millis = (epoch_secs * 1000.0).round() as i64;
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{epoch_secs:.3}"),
    }
}

/// Render `template` with the summary bound to `data`
pub fn render_summary(template: &str, summary: &Summary) -> Result<String> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.render_str(template, context! { data => summary })
        .context("Failed to render summary template")
}

/// Builds and displays the aggregate report
pub struct SummaryBuilder {
    root: PathBuf,
    template: String,
    output: String,
    opener: Option<BrowserOpener>,
}

impl SummaryBuilder {
    pub fn new(
        root: impl Into<PathBuf>,
        template: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            template: template.into(),
            output: output.into(),
            opener: None,
        }
    }

    /// Open the rendered report with `opener` after writing it
    pub fn with_opener(mut self, opener: BrowserOpener) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }

    /// Render the summary of `record`, write it, and open it.
    ///
    /// Returns the path of the written report.
    pub async fn build_summary(&self, record: &RunRecord) -> Result<PathBuf> {
        let summary = Summary::from_record(record, now_epoch_secs());
        info!(
            "Summary: {}/{} device(s) passed in {}s",
            summary.success, summary.count, summary.time
        );

        let template_path = self.root.join(&self.template);
        let template = fs::read_to_string(&template_path)
            .with_context(|| format!("Failed to read template: {}", template_path.display()))?;

        let html = render_summary(&template, &summary)?;
        let output = self.output_path();
        fs::write(&output, html)
            .with_context(|| format!("Failed to write report: {}", output.display()))?;
        info!("Summary report written to {}", output.display());

        if let Some(opener) = &self.opener {
            opener.open(&output)?;
        }

        Ok(output)
    }
}

/// Write the bundled template into `dir`
pub fn write_default_template(dir: &Path, file_name: &str, force: bool) -> Result<PathBuf> {
    let path = dir.join(file_name);
    if path.exists() && !force {
        anyhow::bail!(
            "Template already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }
    fs::write(&path, DEFAULT_TEMPLATE)
        .with_context(|| format!("Failed to write template: {}", path.display()))?;
    Ok(path)
}
