//! Core data model shared by the fetcher, resolver and aggregator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Work item type queried and resolved by the sensor
pub const DEFECT_ITEM_TYPE: &str = "defect";

/// A defect work item as returned by the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DefectRecord {
    pub id: String,
    pub title: Option<String>,
    /// Severity enumeration id, `None` when uncategorized
    pub severity: Option<String>,
    /// Resolution enumeration id, `None` while unresolved
    pub resolution: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

impl DefectRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    /// Classification value of this record on the given axis
    pub fn classification(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Severity => self.severity.as_deref(),
            Axis::Resolution => self.resolution.as_deref(),
        }
    }
}

/// One server-defined state of a classification axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationState {
    pub id: String,
    pub name: String,
}

impl EnumerationState {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Ordered mapping from state id to display name, in server order
///
/// The server guarantees unique ids, so no deduplication happens here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumerationSet {
    states: Vec<EnumerationState>,
}

impl EnumerationSet {
    pub fn new(states: Vec<EnumerationState>) -> Self {
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// An empty set means the axis is not defined for the project
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumerationState> {
        self.states.iter()
    }
}

impl FromIterator<EnumerationState> for EnumerationSet {
    fn from_iter<T: IntoIterator<Item = EnumerationState>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EnumerationSet {
    type Item = &'a EnumerationState;
    type IntoIter = std::slice::Iter<'a, EnumerationState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

/// Classification dimension of a defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Severity,
    Resolution,
}

impl Axis {
    /// Enumeration key used for server lookups
    pub fn attribute_key(self) -> &'static str {
        match self {
            Axis::Severity => "severity",
            Axis::Resolution => "resolution",
        }
    }

    /// Which defects are counted on this axis
    pub fn state_filter(self) -> ResolutionFilter {
        match self {
            Axis::Severity => ResolutionFilter::Unresolved,
            Axis::Resolution => ResolutionFilter::Resolved,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_key())
    }
}

/// Resolution-presence predicate applied to the defect query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionFilter {
    Unresolved,
    Resolved,
}

impl ResolutionFilter {
    /// Predicate term in the tracker query language
    pub fn query_term(self) -> &'static str {
        match self {
            ResolutionFilter::Unresolved => "!resolved",
            ResolutionFilter::Resolved => "resolved",
        }
    }

    /// Already-escaped predicate used in the web UI deep link
    pub fn link_term(self) -> &'static str {
        match self {
            ResolutionFilter::Unresolved => "NOT%20HAS_VALUE:resolution",
            ResolutionFilter::Resolved => "HAS_VALUE:resolution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_per_axis() {
        let record = DefectRecord::new("WI-1")
            .with_severity("critical")
            .with_resolution("done");
        assert_eq!(record.classification(Axis::Severity), Some("critical"));
        assert_eq!(record.classification(Axis::Resolution), Some("done"));

        let open = DefectRecord::new("WI-2");
        assert_eq!(open.classification(Axis::Resolution), None);
    }

    #[test]
    fn test_enumeration_set_keeps_server_order() {
        let set: EnumerationSet = vec![
            EnumerationState::new("critical", "Critical"),
            EnumerationState::new("minor", "Minor"),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = set.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["critical", "minor"]);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_axis_filters() {
        assert_eq!(Axis::Severity.state_filter(), ResolutionFilter::Unresolved);
        assert_eq!(Axis::Resolution.state_filter(), ResolutionFilter::Resolved);
        assert_eq!(ResolutionFilter::Unresolved.query_term(), "!resolved");
        assert_eq!(
            ResolutionFilter::Unresolved.link_term(),
            "NOT%20HAS_VALUE:resolution"
        );
        assert_eq!(Axis::Resolution.to_string(), "resolution");
    }
}
