//! Shared application state

use crate::model::DurationModel;
use crate::stream::EventPublisher;
use std::sync::Arc;

/// Immutable state shared across request handlers.
///
/// The model and publisher are created once at startup and injected here;
/// handlers never reach for globals.
pub struct AppState {
    pub model: Arc<DurationModel>,
    pub publisher: Arc<dyn EventPublisher>,
}

impl AppState {
    pub fn new(model: Arc<DurationModel>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { model, publisher }
    }
}
