//! Mock tracker implementation for testing

use crate::abstractions::tracker::{Credentials, ProjectInfo, TrackerConnector, TrackerSession};
use crate::error::{common, ErrorCode, PolarionError, Result};
use crate::model::{DefectRecord, EnumerationState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type EnumKey = (String, String, String);

#[derive(Default)]
struct MockState {
    projects: HashMap<String, ProjectInfo>,
    query_results: HashMap<String, Option<Vec<DefectRecord>>>,
    enums: HashMap<EnumKey, Vec<EnumerationState>>,
    failing_enums: HashMap<String, String>,
    reject_login: bool,
    fail_disconnect: bool,
    call_delay: Option<Duration>,
    calls: Vec<String>,
    queries: Vec<(String, Vec<String>)>,
    logins: Vec<String>,
    disconnects: usize,
}

/// Builder for creating configured mock trackers
pub struct MockTrackerBuilder {
    state: MockState,
}

impl MockTrackerBuilder {
    pub fn new() -> Self {
        Self {
            state: MockState::default(),
        }
    }

    /// Register a project that resolves
    pub fn with_project(mut self, project_id: &str) -> Self {
        self.state.projects.insert(
            project_id.to_string(),
            ProjectInfo {
                id: project_id.to_string(),
                name: Some(project_id.to_string()),
                unresolvable: false,
            },
        );
        self
    }

    /// Script the result of one exact query string
    pub fn with_query_result(mut self, query: &str, result: Option<Vec<DefectRecord>>) -> Self {
        self.state
            .query_results
            .insert(query.to_string(), result);
        self
    }

    /// Script the enumeration states returned for a key
    pub fn with_enum(
        mut self,
        project_id: &str,
        enum_key: &str,
        item_type: &str,
        states: Vec<EnumerationState>,
    ) -> Self {
        self.state.enums.insert(
            (
                project_id.to_string(),
                enum_key.to_string(),
                item_type.to_string(),
            ),
            states,
        );
        self
    }

    /// Make enumeration lookups for `enum_key` fail with a server fault
    pub fn with_enum_fault(mut self, enum_key: &str, fault: &str) -> Self {
        self.state
            .failing_enums
            .insert(enum_key.to_string(), fault.to_string());
        self
    }

    pub fn reject_login(mut self) -> Self {
        self.state.reject_login = true;
        self
    }

    pub fn fail_disconnect(mut self) -> Self {
        self.state.fail_disconnect = true;
        self
    }

    /// Delay every session call, used to trigger timeouts
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.state.call_delay = Some(delay);
        self
    }

    pub fn build(self) -> MockTracker {
        MockTracker {
            state: Arc::new(Mutex::new(self.state)),
        }
    }
}

impl Default for MockTrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock implementation of both tracker traits
///
/// Unknown projects resolve as unresolvable, unscripted queries return an
/// absent payload and unscripted enumerations are empty.
#[derive(Clone)]
pub struct MockTracker {
    state: Arc<Mutex<MockState>>,
}

impl MockTracker {
    pub fn builder() -> MockTrackerBuilder {
        MockTrackerBuilder::new()
    }

    /// Every call made so far, in order (`logIn`, `getProject:<id>`, ...)
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Query strings and requested fields, in order
    pub fn queries(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn logins(&self) -> Vec<String> {
        self.state.lock().unwrap().logins.clone()
    }

    pub fn disconnect_count(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    fn record(&self, call: String) -> Option<Duration> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.call_delay
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TrackerConnector for MockTracker {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn TrackerSession>> {
        let delay = self.record("logIn".to_string());
        Self::pause(delay).await;

        let mut state = self.state.lock().unwrap();
        state.logins.push(credentials.username.clone());
        if state.reject_login {
            return Err(PolarionError::authentication_with_code(
                ErrorCode::AUTH_REJECTED,
                "Authentication failed: invalid user name or password",
            ));
        }
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl TrackerSession for MockTracker {
    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo> {
        let delay = self.record(format!("getProject:{}", project_id));
        Self::pause(delay).await;

        let state = self.state.lock().unwrap();
        Ok(state
            .projects
            .get(project_id)
            .cloned()
            .unwrap_or_else(|| ProjectInfo {
                id: project_id.to_string(),
                name: None,
                unresolvable: true,
            }))
    }

    async fn query_work_items(
        &self,
        query: &str,
        fields: &[&str],
    ) -> Result<Option<Vec<DefectRecord>>> {
        let delay = self.record(format!("queryWorkItems:{}", query));
        Self::pause(delay).await;

        let mut state = self.state.lock().unwrap();
        state.queries.push((
            query.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        ));
        Ok(state.query_results.get(query).cloned().flatten())
    }

    async fn enum_options(
        &self,
        project_id: &str,
        enum_key: &str,
        item_type: &str,
    ) -> Result<Vec<EnumerationState>> {
        let delay = self.record(format!("getEnumOptions:{}:{}", project_id, enum_key));
        Self::pause(delay).await;

        let state = self.state.lock().unwrap();
        if let Some(fault) = state.failing_enums.get(enum_key) {
            return Err(common::soap_fault(
                "getEnumOptionsForKeyWithControl",
                fault,
            ));
        }
        let key = (
            project_id.to_string(),
            enum_key.to_string(),
            item_type.to_string(),
        );
        Ok(state.enums.get(&key).cloned().unwrap_or_default())
    }

    async fn disconnect(&self) -> Result<()> {
        self.record("endSession".to_string());
        let mut state = self.state.lock().unwrap();
        state.disconnects += 1;
        if state.fail_disconnect {
            return Err(PolarionError::remote("endSession failed"));
        }
        Ok(())
    }
}
