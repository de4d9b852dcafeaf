use crate::abstractions::{with_timeout, TrackerSession};
use crate::error::Result;
use crate::model::{Axis, EnumerationSet};
use std::time::Duration;
use tracing::debug;

/// Looks up the server-defined states of an axis
pub struct EnumerationResolver<'a> {
    session: &'a dyn TrackerSession,
    timeout: Duration,
}

impl<'a> EnumerationResolver<'a> {
    pub fn new(session: &'a dyn TrackerSession, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// States in server order; an empty set means the axis has no states defined
    pub async fn resolve(
        &self,
        project_id: &str,
        axis: Axis,
        item_type: &str,
    ) -> Result<EnumerationSet> {
        let states = with_timeout(
            self.timeout,
            "getEnumOptionsForKeyWithControl",
            self.session
                .enum_options(project_id, axis.attribute_key(), item_type),
        )
        .await?;

        for state in &states {
            debug!("{} Id: {}, name: {}", axis, state.id, state.name);
        }
        Ok(EnumerationSet::new(states))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{EnumerationState, DEFECT_ITEM_TYPE};
    use crate::testing::mocks::MockTracker;

    #[tokio::test]
    async fn test_resolve_keeps_server_order() {
        let tracker = MockTracker::builder()
            .with_enum(
                "test",
                "severity",
                DEFECT_ITEM_TYPE,
                vec![
                    EnumerationState::new("critical", "Critical"),
                    EnumerationState::new("minor", "Minor"),
                ],
            )
            .build();

        let states = EnumerationResolver::new(&tracker, Duration::from_secs(1))
            .resolve("test", Axis::Severity, DEFECT_ITEM_TYPE)
            .await
            .unwrap();

        let ids: Vec<&str> = states.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["critical", "minor"]);
        assert_eq!(tracker.calls(), vec!["getEnumOptions:test:severity".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_enumeration_is_not_an_error() {
        let tracker = MockTracker::builder().build();
        let states = EnumerationResolver::new(&tracker, Duration::from_secs(1))
            .resolve("test", Axis::Resolution, DEFECT_ITEM_TYPE)
            .await
            .unwrap();
        assert!(states.is_empty());
    }

    #[tokio::test]
    async fn test_fault_propagates() {
        let tracker = MockTracker::builder()
            .with_enum_fault("resolution", "No such enumeration")
            .build();
        let err = EnumerationResolver::new(&tracker, Duration::from_secs(1))
            .resolve("test", Axis::Resolution, DEFECT_ITEM_TYPE)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::REMOTE_FAULT);
    }
}
