//! Opening generated reports in the user's browser

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Opens files with a configured command or the platform's default handler
#[derive(Clone, Debug, Default)]
pub struct BrowserOpener {
    command: Option<String>,
}

impl BrowserOpener {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    /// Program and arguments that open `path`
    pub fn command_for(&self, path: &Path) -> (String, Vec<String>) {
        let target = path.to_string_lossy().to_string();
        if let Some(command) = &self.command {
            return (command.clone(), vec![target]);
        }

        if cfg!(target_os = "macos") {
            ("open".to_string(), vec![target])
        } else if cfg!(target_os = "windows") {
            (
                "cmd".to_string(),
                vec!["/C".to_string(), "start".to_string(), String::new(), target],
            )
        } else {
            ("xdg-open".to_string(), vec![target])
        }
    }

    /// Start the opener and return without waiting for it to exit
    pub fn open(&self, path: &Path) -> Result<()> {
        let (program, args) = self.command_for(path);
        debug!("Opening {} with {}", path.display(), program);

        Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to execute {program}"))?;

        Ok(())
    }
}
