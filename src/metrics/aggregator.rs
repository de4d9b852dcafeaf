//! Classification and reconciliation of defect counts
//!
//! Aggregation is two steps. `classify` reduces the fetched records to raw
//! per-id counts; `reconcile` walks the authoritative enumeration in server
//! order and produces one entry per state, zero-filled. Counts for ids the
//! server no longer defines are left out of both the total and the
//! distribution, and records without a value on the axis are not counted.
//! Both exclusions are surfaced on the result and in the logs.

use super::distribution::{Distribution, DistributionEntry};
use crate::model::{Axis, DefectRecord, EnumerationSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Raw counts per classification id, as observed in the records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCounts {
    counts: HashMap<String, u64>,
    unclassified: u64,
}

impl RawCounts {
    pub fn get(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Records that had no value on the axis
    pub fn unclassified(&self) -> u64 {
        self.unclassified
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn increment(&mut self, id: &str) {
        *self.counts.entry(id.to_string()).or_insert(0) += 1;
    }
}

impl FromIterator<(String, u64)> for RawCounts {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
            unclassified: 0,
        }
    }
}

/// Total plus complete, ordered distribution for one axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub axis: Axis,
    pub total_count: u64,
    pub distribution: Distribution,
    /// Records skipped because they carried no value on the axis
    pub unclassified: u64,
    /// Defects whose state is not in the authoritative enumeration
    pub excluded: u64,
}

/// Count records per classification id on `axis`
pub fn classify<'a, I>(records: I, axis: Axis) -> RawCounts
where
    I: IntoIterator<Item = &'a DefectRecord>,
{
    let mut raw = RawCounts::default();
    for record in records {
        match record.classification(axis) {
            Some(id) => raw.increment(id),
            None => raw.unclassified += 1,
        }
    }

    if raw.unclassified > 0 {
        warn!(
            "{} defect(s) without a {} value are not counted",
            raw.unclassified, axis
        );
    }
    raw
}

/// Merge raw counts into the authoritative enumeration
pub fn reconcile(axis: Axis, states: &EnumerationSet, raw: &RawCounts) -> AggregationResult {
    let mut distribution = Vec::with_capacity(states.len());
    let mut total_count = 0u64;
    let known: HashSet<&str> = states.iter().map(|s| s.id.as_str()).collect();

    for state in states {
        let count = raw.get(&state.id);
        total_count += count;
        distribution.push(DistributionEntry::new(state.name.clone(), count));
    }

    let excluded: u64 = raw
        .iter()
        .filter(|(id, _)| !known.contains(id))
        .map(|(id, count)| {
            warn!(
                "{} defect(s) with unconfigured {} '{}' are excluded",
                count, axis, id
            );
            count
        })
        .sum();

    let distribution: Distribution = distribution.into_iter().collect();
    debug!("Distribution of collected issues: {}", distribution);

    AggregationResult {
        axis,
        total_count,
        distribution,
        unclassified: raw.unclassified(),
        excluded,
    }
}

/// Classify then reconcile in one call
pub fn aggregate(axis: Axis, records: &[DefectRecord], states: &EnumerationSet) -> AggregationResult {
    let raw = classify(records, axis);
    reconcile(axis, states, &raw)
}
