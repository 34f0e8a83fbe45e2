//! Command-line interface
//!
//! Two subcommands: `monitor` runs the batch drift/quality flow for one
//! day, `serve` starts the prediction service.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::alert::ConsoleNotifier;
use crate::drift::StatisticalDriftAnalyzer;
use crate::monitor::{run_monitoring, MonitorConfig};
use crate::serve::{run_server, ServeConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(120, 120, 120)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn kv(key: &str, val: &str) {
    println!("  {} {}", dim(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tripwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Trip-duration prediction serving with drift monitoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the drift report and run the quality suite for one day
    Monitor {
        /// Target day (YYYY-MM-DD)
        #[arg(long, default_value = "2023-01-02")]
        date: String,
        /// Root of the trip data tree
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory for HTML report artifacts
        #[arg(long)]
        reports_dir: Option<PathBuf>,
        /// Reference dataset path
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Reference sample size
        #[arg(long)]
        sample_size: Option<usize>,
        /// Sampling seed for reproducible reports
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Start the prediction service
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(long)]
        port: Option<u16>,
        /// Model artifact path
        #[arg(long)]
        model: Option<PathBuf>,
        /// Prediction event log (line-delimited JSON); disabled when omitted
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

/// Run the monitoring flow for one day
pub fn cmd_monitor(
    date: &str,
    data_dir: Option<PathBuf>,
    reports_dir: Option<PathBuf>,
    reference: Option<PathBuf>,
    sample_size: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")?;

    let mut config = MonitorConfig::default();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = reports_dir {
        config.reports_dir = dir;
    }
    if let Some(path) = reference {
        config.reference_path = path;
    }
    if let Some(n) = sample_size {
        config.sample_size = n;
    }
    config.sample_seed = seed;

    section(&format!("Monitoring {}", date));
    kv("data dir", &config.data_dir.display().to_string());
    kv("reference", &config.reference_path.display().to_string());

    let analyzer = StatisticalDriftAnalyzer::new(config.drift.clone());
    let outcome = run_monitoring(&config, date, &analyzer, &ConsoleNotifier)?;

    step_ok(&format!(
        "drift report written to {}",
        outcome.report_path.display()
    ));
    kv(
        "dataset drift",
        if outcome.report.dataset_drift {
            "yes"
        } else {
            "no"
        },
    );
    kv(
        "quality checks",
        &format!(
            "{} run, {} failed",
            outcome.suite.checks.len(),
            outcome.suite.failed().len()
        ),
    );
    if !outcome.suite.all_passed() {
        println!("{}", outcome.suite.summary());
    }
    println!();
    Ok(())
}

/// Start the prediction service
pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
    log: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = ServeConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(model) = model {
        config.model_path = model;
    }
    if log.is_some() {
        config.predictions_log = log;
    }

    run_server(config).await
}
