//! Metric definitions published by the sensor

use crate::model::Axis;
use serde::Serialize;

pub const ISSUES_DOMAIN: &str = "Issues";

pub const OPEN_ISSUES_KEY: &str = "openIssues";
pub const RESOLVED_ISSUES_KEY: &str = "resolvedIssues";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    Int,
}

/// Whether a larger value is better, worse, or neither
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Worse,
    None,
    Better,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value_type: ValueType,
    pub direction: Direction,
    pub qualitative: bool,
    pub domain: &'static str,
}

pub const OPEN_ISSUES: MetricDefinition = MetricDefinition {
    key: OPEN_ISSUES_KEY,
    name: "Polarion Unresolved Issues",
    description: "Number of Unresolved Polarion Issues",
    value_type: ValueType::Int,
    direction: Direction::None,
    qualitative: false,
    domain: ISSUES_DOMAIN,
};

pub const RESOLVED_ISSUES: MetricDefinition = MetricDefinition {
    key: RESOLVED_ISSUES_KEY,
    name: "Polarion Resolved Issues",
    description: "Number of Resolved Polarion Issues",
    value_type: ValueType::Int,
    direction: Direction::None,
    qualitative: false,
    domain: ISSUES_DOMAIN,
};

/// All metrics, in registration order
pub fn all() -> Vec<&'static MetricDefinition> {
    vec![&OPEN_ISSUES, &RESOLVED_ISSUES]
}

pub fn find(key: &str) -> Option<&'static MetricDefinition> {
    all().into_iter().find(|m| m.key == key)
}

/// Metric that carries the distribution of `axis`
pub fn for_axis(axis: Axis) -> &'static MetricDefinition {
    match axis {
        Axis::Severity => &OPEN_ISSUES,
        Axis::Resolution => &RESOLVED_ISSUES,
    }
}
