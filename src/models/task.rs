//! In-memory handle to a launched device run

use std::fmt;
use tokio::process::Child;

/// A runner subprocess started for one device
#[derive(Debug)]
pub struct Task {
    pub device: String,
    pub script: String,
    pub process: Child,
}

impl Task {
    pub fn new(device: impl Into<String>, script: impl Into<String>, process: Child) -> Self {
        Self {
            device: device.into(),
            script: script.into(),
            process,
        }
    }

    /// Block until the subprocess exits and return its exit code.
    ///
    /// Processes killed by a signal have no exit code and report `-1`.
    pub async fn wait(&mut self) -> std::io::Result<i32> {
        let status = self.process.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.process.id() {
            Some(pid) => write!(f, "{} on {} (pid {pid})", self.script, self.device),
            None => write!(f, "{} on {}", self.script, self.device),
        }
    }
}
