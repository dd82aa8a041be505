//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run Airtest scripts on every connected Android device in parallel
#[derive(Parser, Debug)]
#[command(name = "airtest-fleet")]
#[command(version)]
#[command(about = "Run Airtest scripts on every connected Android device in parallel")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error); overrides --verbose
    #[arg(long, global = true, value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: Option<String>,

    /// Configuration file (defaults to ./airtest-fleet.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a script on all connected devices
    Run(RunArgs),

    /// List connected devices
    Devices,

    /// Show stored progress
    Status,

    /// Re-render the summary report from stored progress
    ///
    /// The elapsed time shown is measured from the stored run start to now,
    /// so it includes any time since the run finished.
    Summary {
        /// Do not open the report in a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Delete a script's device logs
    Clean {
        /// Test script or bundle (e.g. test_blackjack.air)
        #[arg(short, long)]
        script: String,
    },

    /// Write the bundled summary template into the working directory
    Init {
        /// Overwrite an existing template
        #[arg(short, long)]
        force: bool,
    },

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Test script or bundle (e.g. test_blackjack.air)
    #[arg(short, long)]
    pub script: String,

    /// Rerun every device from scratch, discarding progress and logs
    #[arg(short, long)]
    pub all: bool,

    /// Device to run on (repeatable); defaults to every connected device
    #[arg(short, long = "device")]
    pub devices: Vec<String>,

    /// Do not open the summary report in a browser
    #[arg(long)]
    pub no_open: bool,

    /// Test runner executable
    #[arg(long)]
    pub runner: Option<String>,

    /// Task drain order (launch, completion)
    #[arg(long)]
    pub drain: Option<String>,
}

/// Arguments for config management
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Show environment variable overrides instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Write a configuration file with default values
    Init {
        /// Output file path
        #[arg(short, long, default_value = "airtest-fleet.yaml")]
        output: String,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}
