//! Integration tests: prediction service endpoints

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use tripwatch::model::DurationModel;
use tripwatch::serve::{create_router, AppState};
use tripwatch::stream::MemoryEventSink;

fn test_model() -> DurationModel {
    let mut pu = HashMap::new();
    pu.insert("1".to_string(), 2.0);
    let mut do_ = HashMap::new();
    do_.insert("2".to_string(), -0.5);
    DurationModel {
        intercept: 10.0,
        trip_distance_weight: 3.0,
        pu_location_weights: pu,
        do_location_weights: do_,
    }
}

fn test_app() -> (axum::Router, Arc<MemoryEventSink>) {
    let sink = Arc::new(MemoryEventSink::new());
    let state = Arc::new(AppState::new(Arc::new(test_model()), sink.clone()));
    (create_router(state), sink)
}

fn predict_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const EXAMPLE_BODY: &str =
    r#"{"ride_id": "abc", "ride": {"PULocationID": 1, "DOLocationID": 2, "trip_distance": 3.5}}"#;

#[tokio::test]
async fn test_predict_returns_duration_shape() {
    let (app, _sink) = test_app();
    let response = app.oneshot(predict_request(EXAMPLE_BODY)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let duration = json["prediction"]["duration"].as_f64().unwrap();
    // 10 + 2 - 0.5 + 3 * 3.5
    assert!((duration - 22.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_predict_publishes_event_keyed_by_ride_id() {
    let (app, sink) = test_app();
    let response = app.oneshot(predict_request(EXAMPLE_BODY)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let (partition_key, event) = &events[0];
    assert_eq!(partition_key, "abc");
    assert_eq!(event.ride_id, "abc");
    assert_eq!(event.ride.pu_location_id, 1);
    assert!((event.features.trip_distance - 3.5).abs() < 1e-9);
    assert!((event.prediction.prediction.duration - 22.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_predict_missing_ride_id_fails_deterministically() {
    let body = r#"{"ride": {"PULocationID": 1, "DOLocationID": 2, "trip_distance": 3.5}}"#;

    let (app, sink) = test_app();
    let first = app
        .clone()
        .oneshot(predict_request(body))
        .await
        .unwrap()
        .status();
    let second = app.oneshot(predict_request(body)).await.unwrap().status();

    assert_eq!(first, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(second, first);
    // A rejected request publishes nothing
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_predict_missing_ride_field_fails() {
    let body = r#"{"ride_id": "abc", "ride": {"PULocationID": 1, "DOLocationID": 2}}"#;

    let (app, _sink) = test_app();
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _sink) = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _sink) = test_app();
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], true);
}
