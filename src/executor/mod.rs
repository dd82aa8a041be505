//! Device task execution
//!
//! Log directory layout, subprocess launching, and run orchestration.

mod launcher;
mod logdir;
mod runner;

pub use launcher::TaskLauncher;
pub use logdir::LogDirs;
pub use runner::FleetRunner;
