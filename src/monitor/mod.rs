//! Batch monitoring pipeline
//!
//! A linear, blocking sequence: load the reference sample and the target
//! day's trips, compute the drift report, persist it as HTML, run the
//! quality suite, and fire the two reactive alert checks. Any failure
//! propagates; there is no retry or partial recovery.

use crate::alert::{Alert, Notifier};
use crate::data::{DataLayout, TripDataLoader};
use crate::drift::{trip_columns, DriftAnalyzer, DriftConfig, DriftReport};
use crate::error::Result;
use crate::quality::{QualityConfig, QualitySuite, SuiteResult};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, warn};

/// Configuration for one monitoring run
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub reference_path: PathBuf,
    pub sample_size: usize,
    /// Fixed seed for the reference sample; random when unset
    pub sample_seed: Option<u64>,
    pub drift: DriftConfig,
    pub quality: QualityConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let data_dir =
            PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        Self {
            reports_dir: PathBuf::from(
                std::env::var("REPORTS_DIR").unwrap_or_else(|_| "reports".to_string()),
            ),
            reference_path: std::env::var("REFERENCE_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("2022").join("01").join("2022-01-full.parquet")),
            sample_size: std::env::var("REFERENCE_SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
            sample_seed: None,
            drift: DriftConfig::default(),
            quality: QualityConfig::default(),
            data_dir,
        }
    }
}

/// Everything one monitoring run produced
pub struct MonitorOutcome {
    pub report: DriftReport,
    pub report_path: PathBuf,
    pub suite: SuiteResult,
    pub alerts: Vec<Alert>,
}

/// Run the monitoring flow for one target day
pub fn run_monitoring(
    config: &MonitorConfig,
    date: NaiveDate,
    analyzer: &dyn DriftAnalyzer,
    notifier: &dyn Notifier,
) -> Result<MonitorOutcome> {
    let layout = DataLayout::new(&config.data_dir, &config.reports_dir);
    let mut loader = TripDataLoader::new(layout.clone(), &config.reference_path)
        .with_sample_size(config.sample_size);
    if let Some(seed) = config.sample_seed {
        loader = loader.with_seed(seed);
    }

    info!(reference = %config.reference_path.display(), "loading reference sample");
    let reference = loader.load_reference_sample()?;

    info!(date = %date, "loading target trips");
    let current = loader.load_trips(date)?;

    // The prediction log is optional; when present, join it back to the
    // trips and report coverage
    if layout.predictions_path(date).exists() {
        let merged = loader.load_merged(date)?;
        info!(
            trips = current.height(),
            with_predictions = merged.height(),
            "prediction log joined with trips"
        );
    }

    let columns = trip_columns();
    let report = analyzer.analyze(&reference, &current, &columns)?;
    let report_path = layout.report_path(date);
    report.save_html(&report_path)?;
    info!(
        path = %report_path.display(),
        dataset_drift = report.dataset_drift,
        drifted = report.drifted_count(),
        "drift report written"
    );

    let suite = QualitySuite::new(config.quality.clone()).run(&reference, &current, &columns)?;
    for check in suite.failed() {
        warn!(check = %check.name, detail = %check.detail, "quality check failed");
    }

    let mut alerts = Vec::new();
    if report.dataset_drift {
        let alert = Alert::dataset_drift(&report);
        notifier.notify(&alert)?;
        alerts.push(alert);
    }
    if !suite.all_passed() {
        let alert = Alert::quality_failure(&suite);
        notifier.notify(&alert)?;
        alerts.push(alert);
    }

    Ok(MonitorOutcome {
        report,
        report_path,
        suite,
        alerts,
    })
}
