//! Integration tests: monitoring pipeline, merge semantics, and alerting

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use tripwatch::alert::{AlertKind, MemoryNotifier};
use tripwatch::data::{DataLayout, TripDataLoader};
use tripwatch::drift::StatisticalDriftAnalyzer;
use tripwatch::model::{prepare_features, Ride};
use tripwatch::monitor::{run_monitoring, MonitorConfig};
use tripwatch::stream::{PredictionEnvelope, PredictionEvent};

fn target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn trips(pu_base: i64, distance_base: f64, rows: usize) -> DataFrame {
    let ids: Vec<String> = (0..rows).map(|i| format!("ride-{}", i)).collect();
    let pu: Vec<i64> = (0..rows).map(|i| pu_base + (i % 5) as i64).collect();
    let do_: Vec<i64> = (0..rows).map(|i| pu_base + ((i + 2) % 5) as i64).collect();
    let distance: Vec<f64> = (0..rows)
        .map(|i| distance_base + (i % 20) as f64 * 0.25)
        .collect();
    df!(
        "ride_id" => ids,
        "PULocationID" => pu,
        "DOLocationID" => do_,
        "trip_distance" => distance,
    )
    .unwrap()
}

fn write_parquet(df: &mut DataFrame, path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let file = File::create(path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();
}

/// Lay out a reference file and a target-day file under a temp data dir
fn setup(root: &Path, reference: &mut DataFrame, target: &mut DataFrame) -> MonitorConfig {
    let data_dir = root.join("data");
    let reference_path = data_dir.join("2022/01/2022-01-full.parquet");
    write_parquet(reference, &reference_path);
    write_parquet(target, &data_dir.join("2023/01/2023-01-02.parquet"));

    let mut config = MonitorConfig::default();
    config.data_dir = data_dir;
    config.reports_dir = root.join("reports");
    config.reference_path = reference_path;
    config.sample_size = 10_000;
    config.sample_seed = Some(42);
    config
}

#[test]
fn test_stable_day_produces_report_and_no_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(
        dir.path(),
        &mut trips(1, 1.0, 400),
        &mut trips(1, 1.0, 400),
    );

    let notifier = MemoryNotifier::new();
    let outcome = run_monitoring(
        &config,
        target_date(),
        &StatisticalDriftAnalyzer::default(),
        &notifier,
    )
    .unwrap();

    assert!(!outcome.report.dataset_drift);
    assert!(outcome.suite.all_passed(), "{}", outcome.suite.summary());
    assert!(notifier.alerts().is_empty());
    assert!(outcome.report_path.exists());
    assert!(outcome
        .report_path
        .to_string_lossy()
        .ends_with("report-2023-01-02.html"));
}

#[test]
fn test_drifted_day_alerts_exactly_once_per_kind() {
    let dir = tempfile::tempdir().unwrap();
    // Shift zones and distances wholesale: drift plus quality failures
    let config = setup(
        dir.path(),
        &mut trips(1, 1.0, 400),
        &mut trips(200, 500.0, 400),
    );

    let notifier = MemoryNotifier::new();
    let outcome = run_monitoring(
        &config,
        target_date(),
        &StatisticalDriftAnalyzer::default(),
        &notifier,
    )
    .unwrap();

    assert!(outcome.report.dataset_drift);
    assert!(!outcome.suite.all_passed());

    let alerts = notifier.alerts();
    assert_eq!(
        alerts
            .iter()
            .filter(|a| a.kind == AlertKind::DatasetDrift)
            .count(),
        1
    );
    assert_eq!(
        alerts
            .iter()
            .filter(|a| a.kind == AlertKind::QualityFailure)
            .count(),
        1
    );

    // The quality alert lists every failing check by name
    let quality_alert = alerts
        .iter()
        .find(|a| a.kind == AlertKind::QualityFailure)
        .unwrap();
    for check in outcome.suite.failed() {
        assert!(
            quality_alert.message.contains(&check.name),
            "alert message missing {}",
            check.name
        );
    }
}

#[test]
fn test_missing_target_day_propagates_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(
        dir.path(),
        &mut trips(1, 1.0, 100),
        &mut trips(1, 1.0, 100),
    );
    // Point at a day that has no data file
    config.sample_seed = Some(7);
    let missing_day = NaiveDate::from_ymd_opt(2023, 3, 9).unwrap();

    let notifier = MemoryNotifier::new();
    let result = run_monitoring(
        &config,
        missing_day,
        &StatisticalDriftAnalyzer::default(),
        &notifier,
    );
    assert!(result.is_err());
    assert!(notifier.alerts().is_empty());
}

fn write_prediction_log(path: &Path, ride_ids: &[&str]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = File::create(path).unwrap();
    for (i, ride_id) in ride_ids.iter().enumerate() {
        let ride = Ride {
            pu_location_id: 1,
            do_location_id: 2,
            trip_distance: 1.0 + i as f64,
        };
        let event = PredictionEvent {
            ride_id: ride_id.to_string(),
            features: prepare_features(&ride),
            ride,
            prediction: PredictionEnvelope::new(10.0 + i as f64),
        };
        writeln!(file, "{}", serde_json::to_string(&event).unwrap()).unwrap();
    }
}

#[test]
fn test_merge_is_inner_join_on_ride_id() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let layout = DataLayout::new(&data_dir, dir.path().join("reports"));

    write_parquet(&mut trips(1, 1.0, 10), &layout.trips_path(target_date()));
    // Log predictions for only four of the ten trips, plus one unknown ride
    write_prediction_log(
        &layout.predictions_path(target_date()),
        &["ride-0", "ride-3", "ride-5", "ride-7", "ghost-ride"],
    );

    let loader = TripDataLoader::new(layout, data_dir.join("unused-reference.parquet"));
    let merged = loader.load_merged(target_date()).unwrap();

    assert_eq!(merged.height(), 4);
    let merged_ids: Vec<String> = merged
        .column("ride_id")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    assert!(merged_ids.contains(&"ride-0".to_string()));
    assert!(!merged_ids.contains(&"ghost-ride".to_string()));
    // Prediction values ride along in the merged frame
    assert!(merged.column("prediction").is_ok());
}

#[test]
fn test_monitoring_runs_with_prediction_log_present() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(
        dir.path(),
        &mut trips(1, 1.0, 200),
        &mut trips(1, 1.0, 200),
    );

    let layout = DataLayout::new(&config.data_dir, &config.reports_dir);
    write_prediction_log(
        &layout.predictions_path(target_date()),
        &["ride-0", "ride-1"],
    );

    let notifier = MemoryNotifier::new();
    let outcome = run_monitoring(
        &config,
        target_date(),
        &StatisticalDriftAnalyzer::default(),
        &notifier,
    )
    .unwrap();
    assert!(outcome.report_path.exists());
}

#[test]
fn test_reference_sample_bounded_by_request() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let reference_path = data_dir.join("2022/01/2022-01-full.parquet");
    write_parquet(&mut trips(1, 1.0, 500), &reference_path);

    let layout = DataLayout::new(&data_dir, dir.path().join("reports"));
    let loader = TripDataLoader::new(layout, &reference_path)
        .with_sample_size(120)
        .with_seed(11);

    let sample = loader.load_reference_sample().unwrap();
    assert_eq!(sample.height(), 120);
}
