//! Progress storage and reporting
//!
//! Persists the run record and builds per-device and aggregate reports.

mod report;
mod storage;
mod summary;

pub use report::ReportBuilder;
pub use storage::ProgressStore;
pub use summary::{write_default_template, SummaryBuilder};
