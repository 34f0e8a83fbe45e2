//! The quality check battery

use crate::drift::{ColumnKind, ColumnSpec};
use crate::error::{Result, TripwatchError};
use crate::quality::{CheckResult, QualityConfig, SuiteResult};
use chrono::Utc;
use polars::prelude::*;
use std::collections::HashSet;

/// Runs the fixed quality battery over (reference, current)
#[derive(Debug, Clone, Default)]
pub struct QualitySuite {
    config: QualityConfig,
}

/// Basic numeric profile of a column
struct NumericProfile {
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
}

impl NumericProfile {
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean,
            std: variance.sqrt(),
            min,
            max,
        })
    }
}

impl QualitySuite {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Run every check and collect the outcomes
    pub fn run(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        columns: &[ColumnSpec],
    ) -> Result<SuiteResult> {
        let mut checks = Vec::new();

        checks.push(self.check_row_count(reference, current));
        checks.push(Self::check_column_count(reference, current));
        checks.push(Self::check_column_types(reference, current));

        for name in reference.get_column_names() {
            if current.column(name).is_ok() {
                checks.push(self.check_missing_share(reference, current, name)?);
            }
        }

        for spec in columns {
            match spec.kind {
                ColumnKind::Numeric => {
                    checks.push(self.check_value_range(reference, current, &spec.name)?);
                    checks.push(self.check_mean_in_sigmas(reference, current, &spec.name)?);
                }
                ColumnKind::Categorical => {
                    checks.push(self.check_vocabulary(reference, current, &spec.name)?);
                }
            }
        }

        Ok(SuiteResult {
            ran_at: Utc::now(),
            checks,
        })
    }

    /// Current row count within a relative margin of the reference count
    fn check_row_count(&self, reference: &DataFrame, current: &DataFrame) -> CheckResult {
        let name = "row_count_within_bounds".to_string();
        let ref_rows = reference.height() as f64;
        let low = (ref_rows * (1.0 - self.config.row_count_margin)).floor();
        let high = (ref_rows * (1.0 + self.config.row_count_margin)).ceil();
        let rows = current.height() as f64;

        let detail = format!("{} rows, expected [{:.0}, {:.0}]", current.height(), low, high);
        if rows >= low && rows <= high {
            CheckResult::passed(name, None, detail)
        } else {
            CheckResult::failed(name, None, detail)
        }
    }

    fn check_column_count(reference: &DataFrame, current: &DataFrame) -> CheckResult {
        let name = "column_count_match".to_string();
        let detail = format!(
            "{} columns, reference has {}",
            current.width(),
            reference.width()
        );
        if current.width() == reference.width() {
            CheckResult::passed(name, None, detail)
        } else {
            CheckResult::failed(name, None, detail)
        }
    }

    /// Every shared column keeps its reference dtype
    fn check_column_types(reference: &DataFrame, current: &DataFrame) -> CheckResult {
        let name = "column_types_match".to_string();
        let mut mismatches = Vec::new();
        for (column, ref_dtype) in reference.get_column_names().into_iter().zip(reference.dtypes()) {
            if let Ok(series) = current.column(column) {
                if series.dtype() != &ref_dtype {
                    mismatches.push(format!(
                        "{} ({} vs {})",
                        column,
                        series.dtype(),
                        ref_dtype
                    ));
                }
            }
        }

        if mismatches.is_empty() {
            CheckResult::passed(name, None, "all shared column types match".to_string())
        } else {
            CheckResult::failed(name, None, format!("type mismatch: {}", mismatches.join(", ")))
        }
    }

    /// Missing-value share must not grow past the reference share + margin
    fn check_missing_share(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        column: &str,
    ) -> Result<CheckResult> {
        let name = format!("missing_share:{}", column);
        let ref_share = missing_share(reference, column)?;
        let cur_share = missing_share(current, column)?;
        let limit = ref_share + self.config.missing_share_margin;

        let detail = format!("{:.4} missing, limit {:.4}", cur_share, limit);
        if cur_share <= limit {
            Ok(CheckResult::passed(name, Some(column.to_string()), detail))
        } else {
            Ok(CheckResult::failed(name, Some(column.to_string()), detail))
        }
    }

    /// Share of values outside the reference [min, max] stays below threshold
    fn check_value_range(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        column: &str,
    ) -> Result<CheckResult> {
        let name = format!("value_range:{}", column);
        let ref_values = numeric_values(reference, column)?;
        let cur_values = numeric_values(current, column)?;

        let profile = NumericProfile::from_values(&ref_values).ok_or_else(|| {
            TripwatchError::ValidationError(format!("reference column '{}' is empty", column))
        })?;

        let out_of_range = cur_values
            .iter()
            .filter(|&&v| v < profile.min || v > profile.max)
            .count();
        let share = out_of_range as f64 / cur_values.len().max(1) as f64;

        let detail = format!(
            "{:.4} outside [{:.2}, {:.2}], limit {:.4}",
            share, profile.min, profile.max, self.config.max_out_of_range_share
        );
        if share <= self.config.max_out_of_range_share {
            Ok(CheckResult::passed(name, Some(column.to_string()), detail))
        } else {
            Ok(CheckResult::failed(name, Some(column.to_string()), detail))
        }
    }

    /// Share of categories unseen in the reference stays below threshold
    fn check_vocabulary(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        column: &str,
    ) -> Result<CheckResult> {
        let name = format!("vocabulary:{}", column);
        let vocabulary: HashSet<i64> = categorical_values(reference, column)?.into_iter().collect();
        let cur_values = categorical_values(current, column)?;

        let unseen = cur_values
            .iter()
            .filter(|v| !vocabulary.contains(v))
            .count();
        let share = unseen as f64 / cur_values.len().max(1) as f64;

        let detail = format!(
            "{:.4} out-of-vocabulary, limit {:.4}",
            share, self.config.max_out_of_vocab_share
        );
        if share <= self.config.max_out_of_vocab_share {
            Ok(CheckResult::passed(name, Some(column.to_string()), detail))
        } else {
            Ok(CheckResult::failed(name, Some(column.to_string()), detail))
        }
    }

    /// Current mean within N reference standard deviations of the reference mean
    fn check_mean_in_sigmas(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        column: &str,
    ) -> Result<CheckResult> {
        let name = format!("mean_in_sigmas:{}", column);
        let ref_values = numeric_values(reference, column)?;
        let cur_values = numeric_values(current, column)?;

        let ref_profile = NumericProfile::from_values(&ref_values).ok_or_else(|| {
            TripwatchError::ValidationError(format!("reference column '{}' is empty", column))
        })?;
        let cur_profile = NumericProfile::from_values(&cur_values).ok_or_else(|| {
            TripwatchError::ValidationError(format!("current column '{}' is empty", column))
        })?;

        let distance = (cur_profile.mean - ref_profile.mean).abs();
        // A constant reference tolerates no shift beyond float noise
        let allowed = if ref_profile.std > 1e-12 {
            self.config.mean_n_sigmas * ref_profile.std
        } else {
            1e-9
        };

        let detail = format!(
            "mean {:.4} vs reference {:.4} (allowed shift {:.4})",
            cur_profile.mean, ref_profile.mean, allowed
        );
        if distance <= allowed {
            Ok(CheckResult::passed(name, Some(column.to_string()), detail))
        } else {
            Ok(CheckResult::failed(name, Some(column.to_string()), detail))
        }
    }
}

fn missing_share(df: &DataFrame, column: &str) -> Result<f64> {
    let series = df
        .column(column)
        .map_err(|_| TripwatchError::ValidationError(format!("column '{}' not found", column)))?;
    Ok(series.null_count() as f64 / df.height().max(1) as f64)
}

fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let series = df
        .column(column)
        .map_err(|_| TripwatchError::ValidationError(format!("column '{}' not found", column)))?;
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().flatten().collect())
}

fn categorical_values(df: &DataFrame, column: &str) -> Result<Vec<i64>> {
    let series = df
        .column(column)
        .map_err(|_| TripwatchError::ValidationError(format!("column '{}' not found", column)))?;
    let casted = series.cast(&DataType::Int64)?;
    Ok(casted.i64()?.into_iter().flatten().collect())
}
