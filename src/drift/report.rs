//! Drift report assembly and rendering

use crate::drift::stattest::{ChiSquareTest, KolmogorovSmirnovTest};
use crate::drift::{ColumnKind, ColumnSpec, DriftAnalyzer, DriftConfig};
use crate::error::{Result, TripwatchError};
use chrono::{DateTime, Utc};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Drift outcome for a single monitored column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    pub kind: ColumnKind,
    /// Test that produced the verdict
    pub method: String,
    pub statistic: f64,
    pub threshold: f64,
    pub drifted: bool,
}

/// Drift comparison of a current dataset against the reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub reference_rows: usize,
    pub current_rows: usize,
    pub columns: Vec<ColumnDrift>,
    /// Share of drifted columns above which the dataset verdict flips
    pub drift_share_threshold: f64,
    /// Dataset-level drift verdict
    pub dataset_drift: bool,
}

impl DriftReport {
    /// Number of drifted columns
    pub fn drifted_count(&self) -> usize {
        self.columns.iter().filter(|c| c.drifted).count()
    }

    /// Names of the drifted columns
    pub fn drifted_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.drifted)
            .map(|c| c.column.as_str())
            .collect()
    }

    /// Plain-text key-value summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str("Drift Report\n");
        s.push_str("============\n");
        s.push_str(&format!("Reference rows: {}\n", self.reference_rows));
        s.push_str(&format!("Current rows: {}\n", self.current_rows));
        s.push_str(&format!("Columns checked: {}\n", self.columns.len()));
        s.push_str(&format!("Drifted columns: {}\n", self.drifted_count()));
        s.push_str(&format!("Dataset drift: {}\n", self.dataset_drift));
        for column in self.columns.iter().filter(|c| c.drifted) {
            s.push_str(&format!(
                "  - {} ({}: {:.4} > {:.4})\n",
                column.column, column.method, column.statistic, column.threshold
            ));
        }
        s
    }

    /// Render the report as a self-contained static HTML page
    pub fn to_html(&self) -> String {
        let verdict = if self.dataset_drift {
            r#"<p class="verdict drift">Dataset drift detected</p>"#
        } else {
            r#"<p class="verdict ok">No dataset drift</p>"#
        };

        let mut rows = String::new();
        for column in &self.columns {
            let kind = match column.kind {
                ColumnKind::Numeric => "numeric",
                ColumnKind::Categorical => "categorical",
            };
            let status = if column.drifted { "drifted" } else { "stable" };
            rows.push_str(&format!(
                "<tr class=\"{status}\"><td>{}</td><td>{kind}</td><td>{}</td>\
                 <td>{:.4}</td><td>{:.4}</td><td>{status}</td></tr>\n",
                column.column, column.method, column.statistic, column.threshold,
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Data Drift Report</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; color: #222; }}
table {{ border-collapse: collapse; margin-top: 1rem; }}
th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.8rem; text-align: left; }}
th {{ background: #f0f0f0; }}
tr.drifted td {{ background: #fdecea; }}
.verdict {{ font-weight: bold; padding: 0.5rem; }}
.verdict.drift {{ color: #b71c1c; }}
.verdict.ok {{ color: #1b5e20; }}
.meta {{ color: #666; }}
</style>
</head>
<body>
<h1>Data Drift Report</h1>
<p class="meta">Generated {generated} &middot; reference rows: {ref_rows} &middot; current rows: {cur_rows}</p>
{verdict}
<p>{drifted} of {total} monitored columns drifted (dataset threshold: share &gt; {share})</p>
<table>
<tr><th>Column</th><th>Kind</th><th>Test</th><th>Statistic</th><th>Critical value</th><th>Status</th></tr>
{rows}</table>
</body>
</html>
"#,
            generated = self.generated_at.to_rfc3339(),
            ref_rows = self.reference_rows,
            cur_rows = self.current_rows,
            drifted = self.drifted_count(),
            total = self.columns.len(),
            share = self.drift_share_threshold,
        )
    }

    /// Write the HTML artifact, creating parent directories as needed
    pub fn save_html(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_html())?;
        Ok(())
    }
}

/// Drift analyzer backed by the in-crate two-sample tests
#[derive(Debug, Clone, Default)]
pub struct StatisticalDriftAnalyzer {
    config: DriftConfig,
}

impl StatisticalDriftAnalyzer {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }
}

impl DriftAnalyzer for StatisticalDriftAnalyzer {
    fn analyze(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        columns: &[ColumnSpec],
    ) -> Result<DriftReport> {
        let ks = KolmogorovSmirnovTest::new(self.config.ks_alpha);
        let chi_square = ChiSquareTest::new(self.config.chi_square_alpha);

        let mut results = Vec::with_capacity(columns.len());
        for spec in columns {
            let outcome = match spec.kind {
                ColumnKind::Numeric => {
                    let ref_values = numeric_column(reference, &spec.name)?;
                    let cur_values = numeric_column(current, &spec.name)?;
                    ks.run(&ref_values, &cur_values)?
                }
                ColumnKind::Categorical => {
                    let ref_values = categorical_column(reference, &spec.name)?;
                    let cur_values = categorical_column(current, &spec.name)?;
                    chi_square.run(&ref_values, &cur_values)?
                }
            };
            results.push(ColumnDrift {
                column: spec.name.clone(),
                kind: spec.kind,
                method: outcome.method,
                statistic: outcome.statistic,
                threshold: outcome.threshold,
                drifted: outcome.drifted,
            });
        }

        let drifted = results.iter().filter(|c| c.drifted).count();
        let share = drifted as f64 / results.len().max(1) as f64;

        Ok(DriftReport {
            generated_at: Utc::now(),
            reference_rows: reference.height(),
            current_rows: current.height(),
            columns: results,
            drift_share_threshold: self.config.dataset_drift_share,
            dataset_drift: share > self.config.dataset_drift_share,
        })
    }
}

/// Extract a column as f64 values, dropping nulls
fn numeric_column(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let series = column(df, name)?;
    let casted = series
        .cast(&DataType::Float64)
        .map_err(|_| not_numeric(name))?;
    let values: Vec<f64> = casted
        .f64()
        .map_err(|_| not_numeric(name))?
        .into_iter()
        .flatten()
        .collect();
    Ok(Array1::from_vec(values))
}

/// Extract a column as i64 category codes, dropping nulls
fn categorical_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = column(df, name)?;
    let casted = series
        .cast(&DataType::Int64)
        .map_err(|_| not_numeric(name))?;
    let values: Vec<i64> = casted
        .i64()
        .map_err(|_| not_numeric(name))?
        .into_iter()
        .flatten()
        .collect();
    Ok(values)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| TripwatchError::ValidationError(format!("column '{}' not found", name)))
}

fn not_numeric(name: &str) -> TripwatchError {
    TripwatchError::ValidationError(format!("column '{}' is not numeric", name))
}
