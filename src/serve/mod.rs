//! Prediction service
//!
//! A stateless HTTP service around the duration model: one POST endpoint,
//! one health endpoint. The model and the event publisher are loaded once
//! at startup and injected into the handlers through shared state.

mod error;
mod handlers;
mod state;

pub use error::ServeError;
pub use state::AppState;

use crate::model::DurationModel;
use crate::stream::{EventPublisher, JsonlEventSink, NoopPublisher};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    /// Line-delimited JSON sink for prediction events; disabled when unset
    pub predictions_log: Option<PathBuf>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(9696),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/duration_model.json")),
            predictions_log: std::env::var("PREDICTIONS_LOG").ok().map(PathBuf::from),
        }
    }
}

/// Build the application router over the given state
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .fallback(handlers::handle_404)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Load the model, wire the publisher, and serve until shutdown
pub async fn run_server(config: ServeConfig) -> anyhow::Result<()> {
    let model = Arc::new(DurationModel::load(&config.model_path)?);
    info!(model = %config.model_path.display(), "duration model loaded");

    let publisher: Arc<dyn EventPublisher> = match &config.predictions_log {
        Some(path) => {
            info!(path = %path.display(), "prediction events will be appended");
            Arc::new(JsonlEventSink::open(path)?)
        }
        None => Arc::new(NoopPublisher),
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::new(model, publisher));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "prediction service listening");

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("shutdown signal received, stopping service");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("service shut down cleanly");
    Ok(())
}
