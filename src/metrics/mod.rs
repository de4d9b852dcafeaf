//! Defect metrics: aggregation, distribution payloads, and measure reporting
//!
//! Fetched defect records are classified per axis, reconciled against the
//! server's enumeration, and persisted as one measure per axis.

pub mod aggregator;
pub mod definitions;
pub mod distribution;
pub mod reporter;
pub mod storage;

pub use aggregator::{aggregate, classify, reconcile, AggregationResult, RawCounts};
pub use definitions::{MetricDefinition, OPEN_ISSUES, RESOLVED_ISSUES};
pub use distribution::{Distribution, DistributionEntry};
pub use reporter::{drill_down_url, Measure, MetricReporter};
pub use storage::{JsonMeasureStore, MeasureStore};

/// Render a measure for terminal output
pub fn format_measure(measure: &Measure) -> String {
    let mut report = String::new();
    let name = definitions::find(&measure.metric_key)
        .map(|d| d.name)
        .unwrap_or(measure.metric_key.as_str());

    report.push_str(&format!("{} ({}): {}\n", name, measure.project_id, measure.value));
    match Distribution::parse(&measure.data) {
        Ok(distribution) => {
            for entry in distribution.entries() {
                report.push_str(&format!("  • {}: {}\n", entry.name, entry.count));
            }
        }
        Err(_) => report.push_str(&format!("  • {}\n", measure.data)),
    }
    report.push_str(&format!("  {}\n", measure.url));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_measure() {
        let measure = Measure {
            metric_key: "openIssues".to_string(),
            project_id: "elibrary".to_string(),
            value: 3,
            data: "Minor=1;Critical=2".to_string(),
            url: "http://srv/polarion".to_string(),
            recorded_at: Utc::now(),
        };

        let text = format_measure(&measure);
        assert!(text.starts_with("Polarion Unresolved Issues (elibrary): 3"));
        assert!(text.contains("  • Minor: 1\n  • Critical: 2\n"));
        assert!(text.contains("http://srv/polarion"));
    }
}
