//! tripwatch - Trip-duration prediction serving with drift monitoring
//!
//! Two independent flows around tabular trip data:
//!
//! - **Monitoring**: compares a reference sample against a target day's
//!   trips, produces a drift report (HTML artifact) and a data-quality
//!   test suite, and raises alerts on drift or quality failures.
//! - **Serving**: a small HTTP service that loads a linear duration model
//!   once at startup, answers `POST /predict`, and publishes each
//!   prediction as a line-delimited JSON event.
//!
//! # Modules
//!
//! - [`data`] - File layout and loaders for trips, predictions, reference
//! - [`model`] - The duration model and feature extraction
//! - [`drift`] - Two-sample drift tests and report generation
//! - [`quality`] - The data-quality check battery
//! - [`alert`] - Reactive notifications for the monitoring flow
//! - [`stream`] - Prediction event publishing
//! - [`monitor`] - The batch monitoring pipeline
//! - [`serve`] - The HTTP prediction service
//! - [`cli`] - Command-line interface

pub mod error;

pub mod alert;
pub mod data;
pub mod drift;
pub mod model;
pub mod monitor;
pub mod quality;
pub mod serve;
pub mod stream;

pub mod cli;

pub use error::{Result, TripwatchError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, TripwatchError};

    pub use crate::data::{DataLayout, TripDataLoader};

    pub use crate::model::{prepare_features, DurationModel, Ride, RideFeatures};

    pub use crate::drift::{
        trip_columns, ColumnKind, ColumnSpec, DriftAnalyzer, DriftConfig, DriftReport,
        StatisticalDriftAnalyzer,
    };

    pub use crate::quality::{CheckStatus, QualityConfig, QualitySuite, SuiteResult};

    pub use crate::alert::{Alert, AlertKind, ConsoleNotifier, Notifier};

    pub use crate::stream::{EventPublisher, JsonlEventSink, PredictionEnvelope, PredictionEvent};

    pub use crate::monitor::{run_monitoring, MonitorConfig, MonitorOutcome};

    pub use crate::serve::{create_router, run_server, AppState, ServeConfig};
}
