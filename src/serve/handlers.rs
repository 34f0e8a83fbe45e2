//! HTTP request handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::model::{prepare_features, Ride};
use crate::stream::{PredictionEnvelope, PredictionEvent};

use super::error::{Result, ServeError};
use super::state::AppState;

/// A prediction request: ride features plus the ride identifier
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub ride_id: String,
    pub ride: Ride,
}

/// Predict a trip duration and publish the prediction event.
///
/// A failed publish is logged but does not change the response; the
/// client sees the prediction either way.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionEnvelope>> {
    let features = prepare_features(&request.ride);
    let duration = state.model.predict(&features);
    let response = PredictionEnvelope::new(duration);

    let event = PredictionEvent {
        ride_id: request.ride_id.clone(),
        ride: request.ride,
        features,
        prediction: response.clone(),
    };
    if let Err(e) = state.publisher.publish(&request.ride_id, &event) {
        warn!(ride_id = %request.ride_id, error = %e, "failed to publish prediction event");
    }

    Ok(Json(response))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn handle_404() -> ServeError {
    ServeError::NotFound("unknown route; POST /predict or GET /health".to_string())
}
