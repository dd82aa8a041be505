//! airtest-fleet - run Airtest scripts across many Android devices
//!
//! Launches one `airtest run` per connected device in parallel, keeps per-device
//! progress in `data.json`, builds each device's HTML report, and renders an
//! aggregate `report.html` from `report_tpl.html`.
//!
//! ## Usage
//!
//! ```bash
//! # Resume: skip devices that already passed
//! airtest-fleet run --script test_blackjack.air
//!
//! # Rerun every device from scratch
//! airtest-fleet run --script test_blackjack.air --all
//!
//! # Only some devices
//! airtest-fleet run -s test_blackjack.air -d emulator-5554 -d 192.168.1.5:5555
//!
//! # Inspect progress and rebuild the summary
//! airtest-fleet status
//! airtest-fleet summary
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod config;
mod device;
mod executor;
mod models;
mod results;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, DrainOrder, EnvConfig};
use device::Adb;
use executor::{FleetRunner, LogDirs};
use results::{ProgressStore, SummaryBuilder};
use utils::{init_logger, BrowserOpener, LogLevel};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(LogLevel::from_args(args.log_level.as_deref(), args.verbose));

    match dispatch(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(args: Args) -> Result<()> {
    let config = AppConfig::resolve(args.config.as_deref())?;

    match args.command {
        cli::Command::Run(run_args) => run(run_args, config).await,
        cli::Command::Devices => list_devices(&config).await,
        cli::Command::Status => show_status(&config),
        cli::Command::Summary { no_open } => rebuild_summary(config, no_open).await,
        cli::Command::Clean { script } => {
            LogDirs::new(working_dir()?).clear_logs(&script)?;
            println!("✓ Cleared logs for {script}");
            Ok(())
        }
        cli::Command::Init { force } => {
            let path = results::write_default_template(&working_dir()?, &config.template, force)?;
            println!("✓ Template written: {}", path.display());
            Ok(())
        }
        cli::Command::Config(config_args) => manage_config(config_args, &config),
    }
}

fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine working directory")
}

async fn run(args: cli::RunArgs, mut config: AppConfig) -> Result<()> {
    if let Some(runner) = args.runner {
        config.runner = runner;
    }
    if let Some(drain) = args.drain.as_deref() {
        config.drain = DrainOrder::from_str(drain)
            .ok_or_else(|| anyhow::anyhow!("Unknown drain order: {drain}"))?;
    }
    if args.no_open {
        config.open_browser = false;
    }

    let devices = if args.devices.is_empty() {
        Adb::new(&config.adb).devices().await?
    } else {
        args.devices
    };

    info!(
        "Running {} on {} device(s) ({})",
        args.script,
        devices.len(),
        if args.all { "full rerun" } else { "resume" }
    );

    let runner = FleetRunner::new(working_dir()?, &config);
    let record = runner.run(&devices, &args.script, args.all).await?;

    println!(
        "\n{}: {}/{} device(s) passed",
        record.script,
        record.success_count(),
        record.count()
    );
    Ok(())
}

async fn list_devices(config: &AppConfig) -> Result<()> {
    let devices = Adb::new(&config.adb).devices().await?;

    if devices.is_empty() {
        println!("No connected devices.");
        return Ok(());
    }

    println!("Connected devices:");
    for device in devices {
        println!("  {device}");
    }
    Ok(())
}

fn show_status(config: &AppConfig) -> Result<()> {
    let store = ProgressStore::new(LogDirs::new(working_dir()?), &config.progress_file);
    if !store.exists() {
        println!("No progress recorded in {}", store.path().display());
        return Ok(());
    }

    let record = store.read()?;
    println!("\nScript: {}", record.script);
    println!("{:-<70}", "");
    println!("{:<28} {:>8}  Report", "Device", "Status");
    println!("{:-<70}", "");
    for (device, result) in &record.tests {
        let report = if result.path.is_empty() {
            "-"
        } else {
            result.path.as_str()
        };
        println!("{:<28} {:>8}  {}", device, result.status, report);
    }
    println!("{:-<70}", "");
    println!("Passed: {}/{}\n", record.success_count(), record.count());
    Ok(())
}

async fn rebuild_summary(config: AppConfig, no_open: bool) -> Result<()> {
    let root = working_dir()?;
    let store = ProgressStore::new(LogDirs::new(&root), &config.progress_file);
    let record = store.read()?;

    let mut builder = SummaryBuilder::new(&root, &config.template, &config.summary_output);
    if config.open_browser && !no_open {
        builder = builder.with_opener(BrowserOpener::new(config.browser.clone()));
    }

    let path = builder.build_summary(&record).await?;
    println!("✓ Summary written: {}", path.display());
    println!("  Elapsed time is measured from the stored run start, not the run's duration.");
    Ok(())
}

fn manage_config(args: cli::ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show { env, format } => {
            if env {
                EnvConfig::load().print_summary();
                println!();
                config::print_env_help();
            } else {
                let output = if format == "json" {
                    serde_json::to_string_pretty(config)?
                } else {
                    serde_yaml::to_string(config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Init { output, force } => {
            let path = std::path::Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::default().save(path)?;
            println!("✓ Configuration file created: {output}");
        }
    }

    Ok(())
}
