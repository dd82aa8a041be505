//! Run record models
//!
//! Defines the progress record persisted between runs and the per-device result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Status recorded when a result could not be produced locally
/// (missing log file, internal error).
pub const FAILURE_STATUS: i32 = -1;

/// Current wall-clock time as fractional epoch seconds
pub fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Outcome of one device for the targeted script
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceResult {
    /// Process exit code (0 = success)
    pub status: i32,

    /// Path to the device's HTML report, empty when none was produced
    #[serde(default)]
    pub path: String,

    /// Owning device, set on failure results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Exit code of the report subcommand, when it ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_status: Option<i32>,
}

impl DeviceResult {
    /// Result of a report that was generated (the report tool's exit code is `status`)
    pub fn report(status: i32, path: impl Into<String>) -> Self {
        Self {
            status,
            path: path.into(),
            device: None,
            report_status: Some(status),
        }
    }

    /// Local bookkeeping failure for a device
    pub fn failure(device: impl Into<String>) -> Self {
        Self {
            status: FAILURE_STATUS,
            path: String::new(),
            device: Some(device.into()),
            report_status: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    pub fn is_local_failure(&self) -> bool {
        self.status == FAILURE_STATUS && self.report_status.is_none()
    }

    /// Fold the runner's exit code into a report result.
    ///
    /// A local failure keeps its sentinel; otherwise the runner's exit code wins.
    pub fn with_run_status(mut self, run_status: i32) -> Self {
        if !self.is_local_failure() {
            self.status = run_status;
        }
        self
    }
}

impl fmt::Display for DeviceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.is_success() { "✓" } else { "✗" };
        if self.path.is_empty() {
            write!(f, "{icon} status={} (no report)", self.status)
        } else {
            write!(f, "{icon} status={} report={}", self.status, self.path)
        }
    }
}

/// Persisted progress for one script across all devices
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Epoch seconds when the current run began
    pub start: f64,

    /// Targeted script or bundle
    pub script: String,

    /// Device identifier -> last result
    #[serde(default)]
    pub tests: BTreeMap<String, DeviceResult>,
}

impl RunRecord {
    /// Fresh record with no results, started now
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            start: now_epoch_secs(),
            script: script.into(),
            tests: BTreeMap::new(),
        }
    }

    /// Whether a prior run already passed on this device
    pub fn has_passed(&self, device: &str) -> bool {
        self.tests
            .get(device)
            .map(DeviceResult::is_success)
            .unwrap_or(false)
    }

    pub fn record(&mut self, device: impl Into<String>, result: DeviceResult) {
        self.tests.insert(device.into(), result);
    }

    pub fn success_count(&self) -> usize {
        self.tests.values().filter(|r| r.is_success()).count()
    }

    pub fn count(&self) -> usize {
        self.tests.len()
    }
}
