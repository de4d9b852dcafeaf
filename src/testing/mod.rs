//! Testing utilities
//!
//! Scripted doubles for the tracker traits and the measure store, shared by
//! unit tests and the integration tests under `tests/`.

pub mod mocks;

use crate::model::{DefectRecord, EnumerationState};

/// Severity states in the order a default Polarion project defines them
pub fn default_severities() -> Vec<EnumerationState> {
    vec![
        EnumerationState::new("blocker", "Blocker"),
        EnumerationState::new("critical", "Critical"),
        EnumerationState::new("major", "Major"),
        EnumerationState::new("normal", "Normal"),
        EnumerationState::new("minor", "Minor"),
    ]
}

pub fn default_resolutions() -> Vec<EnumerationState> {
    vec![
        EnumerationState::new("done", "Done"),
        EnumerationState::new("duplicate", "Duplicate"),
        EnumerationState::new("invalid", "Invalid"),
        EnumerationState::new("wontfix", "Won't Fix"),
    ]
}

/// Defects `<prefix>-1..` with the given severity ids
pub fn open_defects(prefix: &str, severities: &[&str]) -> Vec<DefectRecord> {
    severities
        .iter()
        .enumerate()
        .map(|(i, s)| DefectRecord::new(format!("{}-{}", prefix, i + 1)).with_severity(*s))
        .collect()
}

/// Defects `<prefix>-1..` with the given resolution ids
pub fn resolved_defects(prefix: &str, resolutions: &[&str]) -> Vec<DefectRecord> {
    resolutions
        .iter()
        .enumerate()
        .map(|(i, r)| DefectRecord::new(format!("{}-{}", prefix, i + 1)).with_resolution(*r))
        .collect()
}
