//! Analysis run: connect, fetch and resolve per axis, aggregate, report
//!
//! One run walks `Idle -> Connected -> (Fetching, Resolving) ->
//! Aggregated(severity) -> Aggregated(resolution) -> Disconnected`. Any error
//! moves the run to `Failed`; measures already reported for earlier axes stay
//! persisted, the failing axis persists nothing. The session is closed on
//! every path once it was opened.

pub mod fetcher;
pub mod resolver;

pub use fetcher::{build_query, DefectFetcher, DEFECT_FIELDS};
pub use resolver::EnumerationResolver;

use crate::abstractions::{SessionGuard, TrackerConnector, TrackerSession};
use crate::config::PolarionConfig;
use crate::error::{common, Result};
use crate::metrics::{
    aggregate, AggregationResult, JsonMeasureStore, Measure, MeasureStore, MetricReporter,
};
use crate::model::{Axis, DEFECT_ITEM_TYPE};
use crate::soap::SoapConnector;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Axes reported by every run, in order
pub const AXES: [Axis; 2] = [Axis::Severity, Axis::Resolution];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Connected,
    Fetching(Axis),
    Resolving(Axis),
    Aggregated(Axis),
    Disconnected,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Connected => write!(f, "connected"),
            RunPhase::Fetching(axis) => write!(f, "fetching({})", axis),
            RunPhase::Resolving(axis) => write!(f, "resolving({})", axis),
            RunPhase::Aggregated(axis) => write!(f, "aggregated({})", axis),
            RunPhase::Disconnected => write!(f, "disconnected"),
            RunPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Phases visited by one run
#[derive(Debug, Clone, Default)]
pub struct RunTrace {
    phases: Vec<RunPhase>,
}

impl RunTrace {
    fn enter(&mut self, phase: RunPhase) {
        match self.phases.last() {
            Some(previous) => debug!("run phase: {} -> {}", previous, phase),
            None => debug!("run phase: {}", phase),
        }
        self.phases.push(phase);
    }

    pub fn phases(&self) -> &[RunPhase] {
        &self.phases
    }

    pub fn current(&self) -> Option<RunPhase> {
        self.phases.last().copied()
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub project_id: String,
    pub results: Vec<AggregationResult>,
    pub measures: Vec<Measure>,
    pub trace: RunTrace,
}

/// Polarion issues sensor
pub struct PolarionSensor {
    config: PolarionConfig,
    connector: Arc<dyn TrackerConnector>,
    store: Arc<dyn MeasureStore>,
}

impl PolarionSensor {
    pub fn new(
        config: PolarionConfig,
        connector: Arc<dyn TrackerConnector>,
        store: Arc<dyn MeasureStore>,
    ) -> Self {
        Self {
            config,
            connector,
            store,
        }
    }

    /// Sensor backed by the SOAP transport and the JSON measure file
    ///
    /// The server URL must already be present; see
    /// [`PolarionConfig::ensure_complete`].
    pub fn from_config(config: PolarionConfig) -> Result<Self> {
        let connector = SoapConnector::new(config.server_url(), config.timeout())?;
        let store = JsonMeasureStore::new(config.measures_path.clone());
        Ok(Self::new(config, Arc::new(connector), Arc::new(store)))
    }

    pub fn config(&self) -> &PolarionConfig {
        &self.config
    }

    /// Whether every mandatory parameter is present
    pub fn should_execute(&self) -> bool {
        let missing = self.config.missing_parameters();
        if !missing.is_empty() {
            error!(
                "{} will not run due to some parameters are missing: {}",
                self,
                missing.join(", ")
            );
            return false;
        }
        true
    }

    /// Run one full analysis
    ///
    /// # Errors
    ///
    /// - `Config` when mandatory parameters are missing; nothing is contacted
    /// - `Authentication` when login fails
    /// - `InvalidProject`, `RemoteLookup`, `RemoteTimeout` or `Storage` from
    ///   the per-axis steps; the session is still closed
    pub async fn analyse(&self) -> Result<RunReport> {
        if !self.should_execute() {
            return Err(common::missing_mandatory_parameters(
                &self.config.missing_parameters(),
            ));
        }
        self.config.validate_values()?;

        let mut trace = RunTrace::default();
        trace.enter(RunPhase::Idle);

        let guard = match SessionGuard::open(
            self.connector.as_ref(),
            &self.config.credentials(),
            self.config.timeout(),
        )
        .await
        {
            Ok(guard) => guard,
            Err(e) => {
                trace.enter(RunPhase::Failed);
                error!("Login unsuccessful: {}", e);
                return Err(e);
            }
        };
        trace.enter(RunPhase::Connected);

        let mut report = RunReport {
            project_id: self.config.fetch_project_id().to_string(),
            results: Vec::new(),
            measures: Vec::new(),
            trace: RunTrace::default(),
        };
        let outcome = self
            .run_analysis(guard.session(), guard.timeout(), &mut report, &mut trace)
            .await;

        guard.close().await;

        match outcome {
            Ok(()) => {
                trace.enter(RunPhase::Disconnected);
                report.trace = trace;
                Ok(report)
            }
            Err(e) => {
                trace.enter(RunPhase::Failed);
                error!("{}", e.developer_message());
                Err(e)
            }
        }
    }

    async fn run_analysis(
        &self,
        session: &dyn TrackerSession,
        timeout: std::time::Duration,
        report: &mut RunReport,
        trace: &mut RunTrace,
    ) -> Result<()> {
        let project_id = self.config.fetch_project_id();
        let fetcher = DefectFetcher::new(session, timeout);
        let resolver = EnumerationResolver::new(session, timeout);
        let reporter =
            MetricReporter::new(self.config.server_url(), project_id, self.store.as_ref());

        for axis in AXES {
            trace.enter(RunPhase::Fetching(axis));
            let defects = fetcher.fetch(project_id, axis.state_filter()).await?;

            trace.enter(RunPhase::Resolving(axis));
            let states = resolver.resolve(project_id, axis, DEFECT_ITEM_TYPE).await?;

            let result = aggregate(axis, &defects, &states);
            let measure = reporter
                .report(&result)
                .map_err(|e| e.with_context(format!("while saving {} measure", axis)))?;
            trace.enter(RunPhase::Aggregated(axis));

            info!(
                "{} defects in {}: {} ({})",
                axis, project_id, result.total_count, result.distribution
            );
            report.results.push(result);
            report.measures.push(measure);
        }
        Ok(())
    }
}

impl fmt::Display for PolarionSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polarion issues sensor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, PolarionError};
    use crate::model::{DefectRecord, EnumerationState};
    use crate::testing::mocks::{InMemoryMeasureStore, MockTracker, MockTrackerBuilder};
    use std::time::Duration;

    const OPEN_QUERY: &str = "type:defect AND !resolved AND project.id:test";
    const RESOLVED_QUERY: &str = "type:defect AND resolved AND project.id:test";

    fn config() -> PolarionConfig {
        PolarionConfig {
            server_url: Some("http://my.polarion.server".to_string()),
            fetch_project_id: Some("test".to_string()),
            username: Some("admin".to_string()),
            password: Some("adminPwd".to_string()),
            timeout_secs: 1,
            ..PolarionConfig::default()
        }
    }

    fn scripted() -> MockTrackerBuilder {
        MockTracker::builder()
            .with_project("test")
            .with_enum(
                "test",
                "severity",
                DEFECT_ITEM_TYPE,
                vec![
                    EnumerationState::new("minor", "Minor"),
                    EnumerationState::new("critical", "Critical"),
                ],
            )
            .with_enum(
                "test",
                "resolution",
                DEFECT_ITEM_TYPE,
                vec![
                    EnumerationState::new("done", "Done"),
                    EnumerationState::new("invalid", "Invalid"),
                ],
            )
    }

    fn sensor(tracker: &MockTracker, store: &InMemoryMeasureStore) -> PolarionSensor {
        PolarionSensor::new(config(), Arc::new(tracker.clone()), Arc::new(store.clone()))
    }

    #[test]
    fn test_to_string() {
        let sensor = sensor(&MockTracker::builder().build(), &InMemoryMeasureStore::new());
        assert_eq!(sensor.to_string(), "Polarion issues sensor");
    }

    #[test]
    fn test_should_execute() {
        let store = InMemoryMeasureStore::new();
        let tracker = MockTracker::builder().build();
        assert!(sensor(&tracker, &store).should_execute());

        let mut incomplete = config();
        incomplete.password = None;
        let sensor = PolarionSensor::new(incomplete, Arc::new(tracker), Arc::new(store));
        assert!(!sensor.should_execute());
    }

    #[tokio::test]
    async fn test_full_run() {
        let tracker = scripted()
            .with_query_result(
                OPEN_QUERY,
                Some(vec![
                    DefectRecord::new("T-1").with_severity("minor"),
                    DefectRecord::new("T-2").with_severity("critical"),
                    DefectRecord::new("T-3").with_severity("critical"),
                ]),
            )
            .with_query_result(
                RESOLVED_QUERY,
                Some(vec![DefectRecord::new("T-4").with_resolution("done")]),
            )
            .build();
        let store = InMemoryMeasureStore::new();

        let report = sensor(&tracker, &store).analyse().await.unwrap();

        assert_eq!(report.measures.len(), 2);
        let open = store.find("openIssues").unwrap();
        assert_eq!(open.value, 3);
        assert_eq!(open.data, "Minor=1;Critical=2");
        assert_eq!(
            open.url,
            "http://my.polarion.server/polarion/#/project/test/workitems?query=type:defect%20AND%20NOT%20HAS_VALUE:resolution"
        );
        let resolved = store.find("resolvedIssues").unwrap();
        assert_eq!(resolved.value, 1);
        assert_eq!(resolved.data, "Done=1;Invalid=0");

        assert_eq!(tracker.disconnect_count(), 1);
        assert_eq!(tracker.logins(), vec!["admin".to_string()]);
        assert_eq!(report.trace.current(), Some(RunPhase::Disconnected));
        assert!(report
            .trace
            .phases()
            .contains(&RunPhase::Aggregated(Axis::Resolution)));
    }

    #[tokio::test]
    async fn test_no_results_reports_zero_filled_distribution() {
        let tracker = scripted().build();
        let store = InMemoryMeasureStore::new();

        sensor(&tracker, &store).analyse().await.unwrap();

        let open = store.find("openIssues").unwrap();
        assert_eq!(open.value, 0);
        assert_eq!(open.data, "Minor=0;Critical=0");
    }

    #[tokio::test]
    async fn test_unresolvable_project_aborts_before_query() {
        let tracker = MockTracker::builder().build();
        let store = InMemoryMeasureStore::new();

        let err = sensor(&tracker, &store).analyse().await.unwrap_err();

        assert!(matches!(err, PolarionError::InvalidProject { .. }));
        assert_eq!(err.exit_code(), 4);
        assert!(tracker.queries().is_empty());
        assert!(store.measures().is_empty());
        assert_eq!(tracker.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_enum_fault_keeps_earlier_axis() {
        let tracker = scripted()
            .with_enum_fault("resolution", "Unknown enumeration")
            .build();
        let store = InMemoryMeasureStore::new();

        let err = sensor(&tracker, &store).analyse().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::REMOTE_FAULT);
        assert!(store.find("openIssues").is_some());
        assert!(store.find("resolvedIssues").is_none());
        assert_eq!(tracker.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_skips_everything() {
        let tracker = scripted().reject_login().build();
        let store = InMemoryMeasureStore::new();

        let err = sensor(&tracker, &store).analyse().await.unwrap_err();

        assert!(matches!(err, PolarionError::Authentication { .. }));
        assert_eq!(tracker.calls(), vec!["logIn".to_string()]);
        assert_eq!(tracker.disconnect_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_parameters_contact_nothing() {
        let tracker = scripted().build();
        let mut incomplete = config();
        incomplete.server_url = Some(String::new());
        let sensor = PolarionSensor::new(
            incomplete,
            Arc::new(tracker.clone()),
            Arc::new(InMemoryMeasureStore::new()),
        );

        let err = sensor.analyse().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_timeout_contacts_nothing() {
        let tracker = scripted().build();
        let mut config = config();
        config.timeout_secs = 0;
        let sensor = PolarionSensor::new(
            config,
            Arc::new(tracker.clone()),
            Arc::new(InMemoryMeasureStore::new()),
        );

        let err = sensor.analyse().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_storage_error() {
        let tracker = scripted().build();
        let store = InMemoryMeasureStore::failing();

        let err = sensor(&tracker, &store).analyse().await.unwrap_err();

        assert!(matches!(err, PolarionError::Storage { .. }));
        assert_eq!(tracker.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_login_times_out() {
        let tracker = scripted().with_call_delay(Duration::from_millis(1500)).build();
        let store = InMemoryMeasureStore::new();
        let mut cfg = config();
        cfg.timeout_secs = 1;
        let sensor = PolarionSensor::new(cfg, Arc::new(tracker.clone()), Arc::new(store));

        let err = sensor.analyse().await.unwrap_err();

        assert!(matches!(err, PolarionError::RemoteTimeout { .. }));
        assert!(err.is_connection_failure());
        assert!(tracker.queries().is_empty());
    }
}
