//! Mock implementations for testing
//!
//! This module provides mock implementations for the remote tracker and
//! the measure store.

pub mod store;
pub mod tracker;

pub use store::InMemoryMeasureStore;
pub use tracker::{MockTracker, MockTrackerBuilder};
