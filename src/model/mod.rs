//! Duration prediction model
//!
//! A linear regression over one-hot encoded pickup/dropoff zones plus the
//! trip distance, loaded from a JSON artifact. The model is loaded once
//! and passed around as an immutable handle.

use crate::error::{Result, TripwatchError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One ride as posted to the prediction endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    #[serde(rename = "PULocationID")]
    pub pu_location_id: i64,
    #[serde(rename = "DOLocationID")]
    pub do_location_id: i64,
    pub trip_distance: f64,
}

/// Model input features extracted from a ride
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideFeatures {
    #[serde(rename = "PULocationID")]
    pub pu_location_id: i64,
    #[serde(rename = "DOLocationID")]
    pub do_location_id: i64,
    pub trip_distance: f64,
}

/// Extract exactly the three model features from a ride
pub fn prepare_features(ride: &Ride) -> RideFeatures {
    RideFeatures {
        pu_location_id: ride.pu_location_id,
        do_location_id: ride.do_location_id,
        trip_distance: ride.trip_distance,
    }
}

/// Linear regression duration model.
///
/// Zone identifiers contribute their learned weight when present in the
/// artifact and nothing otherwise (one-hot semantics for unseen zones).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationModel {
    pub intercept: f64,
    pub trip_distance_weight: f64,
    #[serde(default)]
    pub pu_location_weights: HashMap<String, f64>,
    #[serde(default)]
    pub do_location_weights: HashMap<String, f64>,
}

impl DurationModel {
    /// Load a model artifact from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| TripwatchError::ModelError(format!("{}: {}", path.display(), e)))?;
        let model: Self = serde_json::from_str(&raw)
            .map_err(|e| TripwatchError::ModelError(format!("{}: {}", path.display(), e)))?;
        Ok(model)
    }

    /// Predict a trip duration in minutes
    pub fn predict(&self, features: &RideFeatures) -> f64 {
        let pu = self
            .pu_location_weights
            .get(&features.pu_location_id.to_string())
            .copied()
            .unwrap_or(0.0);
        let do_ = self
            .do_location_weights
            .get(&features.do_location_id.to_string())
            .copied()
            .unwrap_or(0.0);

        self.intercept + pu + do_ + self.trip_distance_weight * features.trip_distance
    }
}
