//! Data access module
//!
//! File layout conventions and loaders for trip data, prediction logs,
//! and the reference dataset.

mod layout;
mod loader;

pub use layout::DataLayout;
pub use loader::TripDataLoader;
