//! Defect queries scoped to one project

use crate::abstractions::{with_timeout, TrackerSession};
use crate::error::{common, PolarionError, Result};
use crate::model::{DefectRecord, ResolutionFilter, DEFECT_ITEM_TYPE};
use std::time::Duration;
use tracing::{debug, info};

/// Fields requested for every defect
pub const DEFECT_FIELDS: &[&str] = &["id", "title", "severity", "priority", "status", "resolution"];

/// Query expression understood by the tracker, e.g.
/// `type:defect AND !resolved AND project.id:elibrary`
pub fn build_query(project_id: &str, filter: ResolutionFilter) -> String {
    format!(
        "type:{} AND {} AND project.id:{}",
        DEFECT_ITEM_TYPE,
        filter.query_term(),
        project_id
    )
}

pub struct DefectFetcher<'a> {
    session: &'a dyn TrackerSession,
    timeout: Duration,
}

impl<'a> DefectFetcher<'a> {
    pub fn new(session: &'a dyn TrackerSession, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Fetch the defects of `project_id` matching `filter`
    ///
    /// The project is looked up first; an unresolvable id fails with
    /// `InvalidProject` and no query is sent. A query without result payload
    /// yields an empty list.
    pub async fn fetch(
        &self,
        project_id: &str,
        filter: ResolutionFilter,
    ) -> Result<Vec<DefectRecord>> {
        if project_id.is_empty() {
            return Err(common::empty_project_id());
        }

        let project = with_timeout(
            self.timeout,
            "getProject",
            self.session.get_project(project_id),
        )
        .await?;
        if project.unresolvable {
            return Err(PolarionError::invalid_project(project_id));
        }

        let query = build_query(project_id, filter);
        debug!("Polarion defect query: {}", query);

        let defects = with_timeout(
            self.timeout,
            "queryWorkItems",
            self.session.query_work_items(&query, DEFECT_FIELDS),
        )
        .await?
        .unwrap_or_default();

        info!("Number of defects found in {}: {}", project_id, defects.len());
        Ok(defects)
    }
}
