//! Data drift detection
//!
//! Compares a reference dataset against the current day's data over a
//! fixed column subset and produces a per-column and dataset-level
//! drift verdict.

mod report;
mod stattest;

pub use report::{ColumnDrift, DriftReport, StatisticalDriftAnalyzer};
pub use stattest::{ChiSquareTest, KolmogorovSmirnovTest, StatTestResult};

use crate::error::Result;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// How a monitored column is treated statistically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Continuous values, compared with a two-sample KS test
    Numeric,
    /// Discrete identifiers, compared with a chi-square frequency test
    Categorical,
}

/// A column under drift monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
        }
    }
}

/// The fixed trip-data column subset under monitoring
pub fn trip_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::categorical("PULocationID"),
        ColumnSpec::categorical("DOLocationID"),
        ColumnSpec::numeric("trip_distance"),
    ]
}

/// Configuration for drift analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Significance level for the KS test
    pub ks_alpha: f64,
    /// Significance level for the chi-square test
    pub chi_square_alpha: f64,
    /// Share of drifted columns above which the dataset drifts
    pub dataset_drift_share: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            ks_alpha: 0.05,
            chi_square_alpha: 0.05,
            dataset_drift_share: 0.5,
        }
    }
}

impl DriftConfig {
    /// Set the significance level used by both tests
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.ks_alpha = alpha;
        self.chi_square_alpha = alpha;
        self
    }

    /// Set the dataset drift share threshold
    pub fn with_dataset_drift_share(mut self, share: f64) -> Self {
        self.dataset_drift_share = share.clamp(0.0, 1.0);
        self
    }
}

/// Drift analysis capability.
///
/// The monitoring pipeline depends on this trait rather than a concrete
/// analyzer so it can be exercised against fakes.
pub trait DriftAnalyzer: Send + Sync {
    fn analyze(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        columns: &[ColumnSpec],
    ) -> Result<DriftReport>;
}
