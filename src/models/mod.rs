//! Data models for multi-device test runs
//!
//! The persisted run record and the in-memory task handle.

mod run_record;
mod task;

pub use run_record::{now_epoch_secs, DeviceResult, RunRecord, FAILURE_STATUS};
pub use task::Task;
