//! Trip data loading

use crate::data::DataLayout;
use crate::error::{Result, TripwatchError};
use crate::stream::PredictionEvent;
use chrono::NaiveDate;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads reference samples, daily trip data, and logged predictions.
///
/// All reads are blocking and fail-fast: a missing or malformed file
/// propagates as an error with no recovery.
pub struct TripDataLoader {
    layout: DataLayout,
    reference_path: PathBuf,
    sample_size: usize,
    seed: Option<u64>,
}

impl TripDataLoader {
    /// Create a loader over the given layout and reference dataset
    pub fn new(layout: DataLayout, reference_path: impl AsRef<Path>) -> Self {
        Self {
            layout,
            reference_path: reference_path.as_ref().to_path_buf(),
            sample_size: 10_000,
            seed: None,
        }
    }

    /// Set the reference sample size
    pub fn with_sample_size(mut self, n: usize) -> Self {
        self.sample_size = n;
        self
    }

    /// Fix the sampling seed for reproducible reference samples
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load the reference dataset and sample it down without replacement.
    ///
    /// Returns exactly `sample_size` rows, or the full dataset when it has
    /// fewer rows than requested.
    pub fn load_reference_sample(&self) -> Result<DataFrame> {
        let reference = Self::read_parquet(&self.reference_path)?;
        let sampled = self.sample_rows(&reference)?;
        debug!(
            source_rows = reference.height(),
            sampled_rows = sampled.height(),
            "reference sample loaded"
        );
        Ok(sampled)
    }

    /// Load the target day's trip data
    pub fn load_trips(&self, date: NaiveDate) -> Result<DataFrame> {
        Self::read_parquet(&self.layout.trips_path(date))
    }

    /// Load the day's prediction log into a `(ride_id, prediction)` frame.
    ///
    /// Each log line is a full prediction event; the duration estimate is
    /// pulled out of the nested response payload.
    pub fn load_predictions(&self, date: NaiveDate) -> Result<DataFrame> {
        let path = self.layout.predictions_path(date);
        let file = File::open(&path)
            .map_err(|e| TripwatchError::DataError(format!("{}: {}", path.display(), e)))?;

        let mut ride_ids = Vec::new();
        let mut durations = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: PredictionEvent = serde_json::from_str(&line)?;
            ride_ids.push(event.ride_id);
            durations.push(event.prediction.prediction.duration);
        }

        let df = df!(
            "ride_id" => ride_ids,
            "prediction" => durations,
        )?;
        Ok(df)
    }

    /// Load the day's trips joined with their logged predictions.
    ///
    /// Inner join on `ride_id`: trips without a logged prediction are
    /// dropped from the result.
    pub fn load_merged(&self, date: NaiveDate) -> Result<DataFrame> {
        let trips = self.load_trips(date)?;
        let predictions = self.load_predictions(date)?;

        let merged = trips.join(
            &predictions,
            ["ride_id"],
            ["ride_id"],
            JoinArgs::new(JoinType::Inner),
        )?;
        Ok(merged)
    }

    fn read_parquet(path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| TripwatchError::DataError(format!("{}: {}", path.display(), e)))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| TripwatchError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Sample rows without replacement, preserving the source schema
    fn sample_rows(&self, df: &DataFrame) -> Result<DataFrame> {
        let n = self.sample_size.min(df.height());
        if n == df.height() {
            return Ok(df.clone());
        }

        let mut rng: StdRng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let indices: Vec<IdxSize> = rand::seq::index::sample(&mut rng, df.height(), n)
            .iter()
            .map(|i| i as IdxSize)
            .collect();

        let idx = IdxCa::from_vec("idx", indices);
        Ok(df.take(&idx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_with_sample(n: usize) -> TripDataLoader {
        TripDataLoader::new(DataLayout::new("data", "reports"), "reference.parquet")
            .with_sample_size(n)
            .with_seed(42)
    }

    fn frame(rows: usize) -> DataFrame {
        let ids: Vec<String> = (0..rows).map(|i| format!("ride-{}", i)).collect();
        let distances: Vec<f64> = (0..rows).map(|i| i as f64 * 0.5).collect();
        df!(
            "ride_id" => ids,
            "trip_distance" => distances,
        )
        .unwrap()
    }

    #[test]
    fn test_sample_exact_count() {
        let df = frame(100);
        let sampled = loader_with_sample(30).sample_rows(&df).unwrap();
        assert_eq!(sampled.height(), 30);
    }

    #[test]
    fn test_sample_smaller_source_returns_all() {
        let df = frame(5);
        let sampled = loader_with_sample(30).sample_rows(&df).unwrap();
        assert_eq!(sampled.height(), 5);
    }

    #[test]
    fn test_sample_is_subset_without_replacement() {
        let df = frame(50);
        let sampled = loader_with_sample(20).sample_rows(&df).unwrap();

        let source: Vec<String> = df
            .column("ride_id")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        let mut picked: Vec<String> = sampled
            .column("ride_id")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();

        for id in &picked {
            assert!(source.contains(id));
        }
        // Without replacement: no duplicate ride ids in the sample
        picked.sort();
        picked.dedup();
        assert_eq!(picked.len(), 20);
    }

    #[test]
    fn test_sample_seeded_is_deterministic() {
        let df = frame(80);
        let a = loader_with_sample(10).sample_rows(&df).unwrap();
        let b = loader_with_sample(10).sample_rows(&df).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_missing_trips_file_propagates() {
        let loader = loader_with_sample(10);
        let date = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        assert!(loader.load_trips(date).is_err());
    }
}
