//! Packages aggregation results into persisted measures

use super::aggregator::AggregationResult;
use super::definitions;
use super::storage::MeasureStore;
use crate::error::Result;
use crate::model::{ResolutionFilter, DEFECT_ITEM_TYPE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One persisted metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub metric_key: String,
    pub project_id: String,
    /// Total defect count
    pub value: u64,
    /// Serialized distribution, `Name=count` pairs joined by `;`
    pub data: String,
    /// Drill-down link into the Polarion web UI
    pub url: String,
    pub recorded_at: DateTime<Utc>,
}

/// Builds measures for one server and project and hands them to a store
pub struct MetricReporter<'a> {
    server_url: String,
    project_id: String,
    store: &'a dyn MeasureStore,
}

impl<'a> MetricReporter<'a> {
    pub fn new(
        server_url: impl Into<String>,
        project_id: impl Into<String>,
        store: &'a dyn MeasureStore,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            project_id: project_id.into(),
            store,
        }
    }

    /// Deep link to the defects matching `filter`
    ///
    /// Plain concatenation; the project id is not escaped.
    pub fn drill_down_url(&self, filter: ResolutionFilter) -> String {
        drill_down_url(&self.server_url, &self.project_id, filter)
    }

    pub fn build_measure(&self, result: &AggregationResult) -> Measure {
        let metric = definitions::for_axis(result.axis);
        Measure {
            metric_key: metric.key.to_string(),
            project_id: self.project_id.clone(),
            value: result.total_count,
            data: result.distribution.to_data_string(),
            url: self.drill_down_url(result.axis.state_filter()),
            recorded_at: Utc::now(),
        }
    }

    /// Build and persist the measure for one axis
    pub fn report(&self, result: &AggregationResult) -> Result<Measure> {
        let measure = self.build_measure(result);
        debug!("polarion defect url: {}", measure.url);
        debug!("distribution: {}", measure.data);
        self.store.save_measure(&measure)?;
        debug!(
            "Saved measure {} = {} for project {}",
            measure.metric_key, measure.value, measure.project_id
        );
        Ok(measure)
    }
}

pub fn drill_down_url(server_url: &str, project_id: &str, filter: ResolutionFilter) -> String {
    format!(
        "{}/polarion/#/project/{}/workitems?query=type:{}%20AND%20{}",
        server_url,
        project_id,
        DEFECT_ITEM_TYPE,
        filter.link_term()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregator::aggregate;
    use crate::model::{Axis, DefectRecord, EnumerationSet, EnumerationState};
    use crate::testing::mocks::InMemoryMeasureStore;

    #[test]
    fn test_drill_down_urls() {
        assert_eq!(
            drill_down_url("http://my.polarion.server", "test", ResolutionFilter::Unresolved),
            "http://my.polarion.server/polarion/#/project/test/workitems?query=type:defect%20AND%20NOT%20HAS_VALUE:resolution"
        );
        assert_eq!(
            drill_down_url("http://my.polarion.server", "test", ResolutionFilter::Resolved),
            "http://my.polarion.server/polarion/#/project/test/workitems?query=type:defect%20AND%20HAS_VALUE:resolution"
        );
    }

    #[test]
    fn test_project_id_is_not_escaped() {
        let url = drill_down_url("http://srv", "my project&x", ResolutionFilter::Resolved);
        assert!(url.contains("/project/my project&x/workitems"));
    }

    #[test]
    fn test_report_persists_measure() {
        let store = InMemoryMeasureStore::new();
        let reporter = MetricReporter::new("http://localhost", "test", &store);
        let states = EnumerationSet::new(vec![
            EnumerationState::new("done", "Done"),
            EnumerationState::new("rejected", "Rejected"),
        ]);
        let records = vec![
            DefectRecord::new("1").with_resolution("done"),
            DefectRecord::new("2").with_resolution("rejected"),
            DefectRecord::new("3").with_resolution("rejected"),
        ];
        let result = aggregate(Axis::Resolution, &records, &states);

        let measure = reporter.report(&result).unwrap();

        assert_eq!(measure.metric_key, "resolvedIssues");
        assert_eq!(measure.value, 3);
        assert_eq!(measure.data, "Done=1;Rejected=2");
        assert!(measure.url.ends_with("HAS_VALUE:resolution"));
        assert_eq!(store.measures(), vec![measure]);
    }
}
