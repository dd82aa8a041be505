//! Configuration module
//!
//! Handles loading and layering configuration: defaults, config file,
//! environment variables, then command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Order in which launched device tasks are waited on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOrder {
    /// Wait on tasks in the order they were launched
    #[default]
    Launch,
    /// Take whichever task exits first
    Completion,
}

impl DrainOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "launch" => Some(DrainOrder::Launch),
            "completion" | "complete" => Some(DrainOrder::Completion),
            _ => None,
        }
    }
}

impl fmt::Display for DrainOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainOrder::Launch => write!(f, "launch"),
            DrainOrder::Completion => write!(f, "completion"),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Test runner executable
    pub runner: String,

    /// Device bridge executable
    pub adb: String,

    /// Progress file, relative to the working directory
    pub progress_file: String,

    /// Summary template, relative to the working directory
    pub template: String,

    /// Rendered summary report, relative to the working directory
    pub summary_output: String,

    /// Language passed to the runner's report subcommand
    pub report_lang: String,

    /// Open the summary report when done
    pub open_browser: bool,

    /// Command used to open the report (platform default when unset)
    pub browser: Option<String>,

    /// Task drain order
    pub drain: DrainOrder,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runner: "airtest".to_string(),
            adb: "adb".to_string(),
            progress_file: "data.json".to_string(),
            template: "report_tpl.html".to_string(),
            summary_output: "report.html".to_string(),
            report_lang: "zh".to_string(),
            open_browser: true,
            browser: None,
            drain: DrainOrder::Launch,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from an explicit file or the standard locations,
    /// then apply environment overrides
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => ConfigFile::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => ConfigFile::load_default()?,
        };

        let mut config = file.app;
        EnvConfig::load().apply(&mut config);
        Ok(config)
    }
}
