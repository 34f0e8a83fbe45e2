//! Date-keyed file layout

use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};

/// Encodes where trip data, prediction logs, and reports live on disk.
///
/// Trip data for a day is stored at `<data_dir>/<yyyy>/<mm>/<yyyy>-<mm>-<dd>.parquet`,
/// the matching prediction log at the sibling `...-predictions.jsonl`, and
/// drift reports under `<reports_dir>/report-<yyyy>-<mm>-<dd>.html`.
#[derive(Debug, Clone)]
pub struct DataLayout {
    data_dir: PathBuf,
    reports_dir: PathBuf,
}

impl DataLayout {
    /// Create a layout rooted at the given directories
    pub fn new(data_dir: impl AsRef<Path>, reports_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            reports_dir: reports_dir.as_ref().to_path_buf(),
        }
    }

    /// Path to the trip data file for a day
    pub fn trips_path(&self, date: NaiveDate) -> PathBuf {
        self.day_dir(date).join(format!("{}.parquet", Self::date_stamp(date)))
    }

    /// Path to the prediction log for a day
    pub fn predictions_path(&self, date: NaiveDate) -> PathBuf {
        self.day_dir(date)
            .join(format!("{}-predictions.jsonl", Self::date_stamp(date)))
    }

    /// Path to the drift report artifact for a day
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.reports_dir
            .join(format!("report-{}.html", Self::date_stamp(date)))
    }

    /// Root data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root reports directory
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
    }

    fn date_stamp(date: NaiveDate) -> String {
        format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
    }
}
