//! Measure storage and persistence

use super::reporter::Measure;
use crate::error::{ErrorCode, ErrorExt, PolarionError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for measures produced by a run
pub trait MeasureStore: Send + Sync {
    /// Persist a measure, replacing any earlier one for the same metric and project
    fn save_measure(&self, measure: &Measure) -> Result<()>;

    /// All stored measures
    fn load_measures(&self) -> Result<Vec<Measure>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MeasureFile {
    measures: Vec<Measure>,
}

/// Keeps the latest measure per metric and project in one JSON file
pub struct JsonMeasureStore {
    path: PathBuf,
}

impl JsonMeasureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<MeasureFile> {
        if !self.path.exists() {
            debug!("No existing measures found at {:?}", self.path);
            return Ok(MeasureFile::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .to_storage_error(format!("Failed to read measures from {}", self.path.display()))?;
        serde_json::from_str(&content).map_err(|e| {
            PolarionError::storage_with_code(
                ErrorCode::STORAGE_DESERIALIZATION_ERROR,
                "Failed to deserialize measures",
                Some(self.path.clone()),
            )
            .with_source(e)
        })
    }

    fn write_file(&self, file: &MeasureFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .to_storage_error("Failed to create measures directory")?;
            }
        }

        let content = serde_json::to_string_pretty(file).map_err(|e| {
            PolarionError::storage_with_code(
                ErrorCode::STORAGE_SERIALIZATION_ERROR,
                "Failed to serialize measures",
                Some(self.path.clone()),
            )
            .with_source(e)
        })?;
        std::fs::write(&self.path, content)
            .to_storage_error(format!("Failed to write measures to {}", self.path.display()))?;
        Ok(())
    }
}

impl MeasureStore for JsonMeasureStore {
    fn save_measure(&self, measure: &Measure) -> Result<()> {
        let mut file = self.read_file()?;
        file.measures.retain(|m| {
            !(m.metric_key == measure.metric_key && m.project_id == measure.project_id)
        });
        file.measures.push(measure.clone());
        self.write_file(&file)?;

        debug!("Saved measure {} to {:?}", measure.metric_key, self.path);
        Ok(())
    }

    fn load_measures(&self) -> Result<Vec<Measure>> {
        Ok(self.read_file()?.measures)
    }
}
