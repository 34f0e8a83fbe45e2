//! Data quality test suite
//!
//! A fixed battery of pass/fail checks comparing the current dataset
//! against the reference. Failures are collected and surfaced; there is
//! no retry or escalation policy.

mod checks;

pub use checks::QualitySuite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passed,
    Failed,
}

/// One named check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check identifier, e.g. `missing_share:trip_distance`
    pub name: String,
    /// Column the check applies to, when column-scoped
    pub column: Option<String>,
    pub status: CheckStatus,
    /// Human-readable outcome detail
    pub detail: String,
}

impl CheckResult {
    pub(crate) fn passed(name: String, column: Option<String>, detail: String) -> Self {
        Self {
            name,
            column,
            status: CheckStatus::Passed,
            detail,
        }
    }

    pub(crate) fn failed(name: String, column: Option<String>, detail: String) -> Self {
        Self {
            name,
            column,
            status: CheckStatus::Failed,
            detail,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

/// Collected results of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub ran_at: DateTime<Utc>,
    pub checks: Vec<CheckResult>,
}

impl SuiteResult {
    /// All failing checks
    pub fn failed(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| c.is_failed()).collect()
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| !c.is_failed())
    }

    /// One line per check, FAIL lines first
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(self.checks.len());
        for check in self.checks.iter().filter(|c| c.is_failed()) {
            lines.push(format!("FAIL {} - {}", check.name, check.detail));
        }
        for check in self.checks.iter().filter(|c| !c.is_failed()) {
            lines.push(format!("PASS {} - {}", check.name, check.detail));
        }
        lines.join("\n")
    }
}

/// Thresholds for the quality battery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Allowed relative deviation of the current row count from the reference
    pub row_count_margin: f64,
    /// Allowed increase of a column's missing-value share over the reference
    pub missing_share_margin: f64,
    /// Allowed share of numeric values outside the reference [min, max]
    pub max_out_of_range_share: f64,
    /// Allowed share of categorical values absent from the reference vocabulary
    pub max_out_of_vocab_share: f64,
    /// Allowed distance of the current mean from the reference mean, in
    /// reference standard deviations
    pub mean_n_sigmas: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            row_count_margin: 0.10,
            missing_share_margin: 0.05,
            max_out_of_range_share: 0.01,
            max_out_of_vocab_share: 0.02,
            mean_n_sigmas: 3.0,
        }
    }
}

impl QualityConfig {
    pub fn with_row_count_margin(mut self, margin: f64) -> Self {
        self.row_count_margin = margin.max(0.0);
        self
    }

    pub fn with_mean_n_sigmas(mut self, n: f64) -> Self {
        self.mean_n_sigmas = n.max(0.0);
        self
    }
}
