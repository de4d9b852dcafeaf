//! In-memory measure store for testing

use crate::error::{PolarionError, Result};
use crate::metrics::{Measure, MeasureStore};
use std::sync::{Arc, Mutex};

/// Collects measures in memory, optionally failing every save
#[derive(Clone, Default)]
pub struct InMemoryMeasureStore {
    measures: Arc<Mutex<Vec<Measure>>>,
    fail_saves: bool,
}

impl InMemoryMeasureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn measures(&self) -> Vec<Measure> {
        self.measures.lock().unwrap().clone()
    }

    pub fn find(&self, metric_key: &str) -> Option<Measure> {
        self.measures()
            .into_iter()
            .find(|m| m.metric_key == metric_key)
    }
}

impl MeasureStore for InMemoryMeasureStore {
    fn save_measure(&self, measure: &Measure) -> Result<()> {
        if self.fail_saves {
            return Err(PolarionError::storage("store is read-only"));
        }
        self.measures.lock().unwrap().push(measure.clone());
        Ok(())
    }

    fn load_measures(&self) -> Result<Vec<Measure>> {
        Ok(self.measures())
    }
}
