//! Alerting
//!
//! Purely reactive notifications for the monitoring flow: one alert when
//! the dataset drifts, one when any quality check fails. The console
//! notifier stands in for a real paging integration; no throttling,
//! deduplication, or severity policy.

use crate::drift::DriftReport;
use crate::error::Result;
use crate::quality::SuiteResult;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::warn;

/// What triggered an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    DatasetDrift,
    QualityFailure,
}

/// A single emitted alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
}

impl Alert {
    /// Alert for a dataset-level drift verdict
    pub fn dataset_drift(report: &DriftReport) -> Self {
        Self {
            kind: AlertKind::DatasetDrift,
            message: format!(
                "dataset drift detected: {} of {} monitored columns drifted ({})",
                report.drifted_count(),
                report.columns.len(),
                report.drifted_columns().join(", ")
            ),
            triggered_at: Utc::now(),
        }
    }

    /// Alert listing every failing quality check
    pub fn quality_failure(result: &SuiteResult) -> Self {
        let failing: Vec<String> = result
            .failed()
            .iter()
            .map(|c| format!("{} ({})", c.name, c.detail))
            .collect();
        Self {
            kind: AlertKind::QualityFailure,
            message: format!(
                "{} data quality check(s) failed: {}",
                failing.len(),
                failing.join("; ")
            ),
            triggered_at: Utc::now(),
        }
    }
}

/// Notification capability.
///
/// The pipeline depends on this trait so tests can capture alerts
/// without a real notification backend.
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Prints alerts to the console and the structured log
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        let label = match alert.kind {
            AlertKind::DatasetDrift => "DATA DRIFT",
            AlertKind::QualityFailure => "DATA QUALITY",
        };
        println!("  {} {}", format!("ALERT [{}]", label).red().bold(), alert.message);
        warn!(kind = ?alert.kind, message = %alert.message, "alert triggered");
        Ok(())
    }
}

/// Records alerts in memory, for tests
#[derive(Default)]
pub struct MemoryNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every alert received so far
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert.clone());
        }
        Ok(())
    }
}
