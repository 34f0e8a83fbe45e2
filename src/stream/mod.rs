//! Prediction event streaming
//!
//! The serving flow publishes one event per prediction to a streaming
//! sink, keyed by ride identifier. The sink is an abstract capability so
//! the handler can be exercised against a fake; the file-backed
//! implementation appends line-delimited JSON in the exact shape the
//! monitoring flow reads back.

use crate::error::{Result, TripwatchError};
use crate::model::{Ride, RideFeatures};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::trace;

/// Scalar duration estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationPrediction {
    pub duration: f64,
}

/// Wire shape of a prediction response: `{"prediction": {"duration": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub prediction: DurationPrediction,
}

impl PredictionEnvelope {
    pub fn new(duration: f64) -> Self {
        Self {
            prediction: DurationPrediction { duration },
        }
    }
}

/// One published prediction record: identifiers, raw ride fields, derived
/// features, and the full response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEvent {
    pub ride_id: String,
    pub ride: Ride,
    pub features: RideFeatures,
    pub prediction: PredictionEnvelope,
}

/// Streaming sink capability.
///
/// Implementations route each record by partition key; delivery is
/// fire-and-forget with no confirmation handling.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, partition_key: &str, event: &PredictionEvent) -> Result<()>;
}

/// Appends each event as one JSON object plus newline to a file
pub struct JsonlEventSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlEventSink {
    /// Open (or create) the sink file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path this sink appends to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventPublisher for JsonlEventSink {
    fn publish(&self, partition_key: &str, event: &PredictionEvent) -> Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| TripwatchError::PublishError("sink lock poisoned".to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| TripwatchError::PublishError(format!("{}: {}", self.path.display(), e)))?;
        trace!(partition_key, path = %self.path.display(), "prediction event published");
        Ok(())
    }
}

/// Discards every event; used when no log sink is configured
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, partition_key: &str, _event: &PredictionEvent) -> Result<()> {
        trace!(partition_key, "prediction event discarded (no sink configured)");
        Ok(())
    }
}

/// In-memory sink recording `(partition_key, event)` pairs, for tests
#[derive(Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<(String, PredictionEvent)>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far
    pub fn events(&self) -> Vec<(String, PredictionEvent)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventPublisher for MemoryEventSink {
    fn publish(&self, partition_key: &str, event: &PredictionEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| TripwatchError::PublishError("sink lock poisoned".to_string()))?
            .push((partition_key.to_string(), event.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::prepare_features;

    fn event(ride_id: &str, duration: f64) -> PredictionEvent {
        let ride = Ride {
            pu_location_id: 1,
            do_location_id: 2,
            trip_distance: 3.5,
        };
        PredictionEvent {
            ride_id: ride_id.to_string(),
            ride: ride.clone(),
            features: prepare_features(&ride),
            prediction: PredictionEnvelope::new(duration),
        }
    }

    #[test]
    fn test_jsonl_sink_appends_line_delimited_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.jsonl");

        let sink = JsonlEventSink::open(&path).unwrap();
        sink.publish("abc", &event("abc", 12.0)).unwrap();
        sink.publish("def", &event("def", 8.5)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(raw.ends_with('\n'));

        let first: PredictionEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.ride_id, "abc");
        assert!((first.prediction.prediction.duration - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(event("abc", 21.3)).unwrap();
        assert_eq!(json["ride_id"], "abc");
        assert_eq!(json["ride"]["PULocationID"], 1);
        assert_eq!(json["features"]["trip_distance"], 3.5);
        assert_eq!(json["prediction"]["prediction"]["duration"], 21.3);
    }

    #[test]
    fn test_memory_sink_records_partition_key() {
        let sink = MemoryEventSink::new();
        sink.publish("ride-1", &event("ride-1", 5.0)).unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "ride-1");
    }
}
