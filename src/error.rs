//! Crate-wide error type

use thiserror::Error;

/// Errors produced by the monitoring and serving flows
#[derive(Error, Debug)]
pub enum TripwatchError {
    /// Data loading or parsing failure
    #[error("Data error: {0}")]
    DataError(String),

    /// Invalid input or configuration
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Model loading or inference failure
    #[error("Model error: {0}")]
    ModelError(String),

    /// Event publishing failure
    #[error("Publish error: {0}")]
    PublishError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TripwatchError>;
