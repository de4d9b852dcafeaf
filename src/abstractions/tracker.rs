//! Remote tracker abstraction layer
//!
//! Provides trait-based abstraction for the Polarion web services so the
//! sensor can be exercised without a live server. A session value only
//! exists once `connect` succeeded and is consumed by `SessionGuard::close`,
//! so query and lookup calls cannot happen outside a live session.

use crate::error::{PolarionError, Result};
use crate::model::{DefectRecord, EnumerationState};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Login credentials for the tracker
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Project as reported by the project service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectInfo {
    pub id: String,
    pub name: Option<String>,
    /// Set by the server when the requested id does not exist
    pub unresolvable: bool,
}

/// Opens authenticated sessions against a tracker server
#[async_trait]
pub trait TrackerConnector: Send + Sync {
    /// Log in and return a live session
    ///
    /// # Errors
    ///
    /// - `Authentication` when the credentials are rejected or the server
    ///   cannot be reached
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn TrackerSession>>;
}

/// Operations available on a live tracker session
#[async_trait]
pub trait TrackerSession: Send + Sync {
    /// Look up a project by id
    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo>;

    /// Run a work item query
    ///
    /// Returns `Ok(None)` when the server sends no result payload at all. The
    /// protocol signals "no results" that way, so it must not be turned into an
    /// error here.
    async fn query_work_items(
        &self,
        query: &str,
        fields: &[&str],
    ) -> Result<Option<Vec<DefectRecord>>>;

    /// Enumeration states of `enum_key` for the given item type
    async fn enum_options(
        &self,
        project_id: &str,
        enum_key: &str,
        item_type: &str,
    ) -> Result<Vec<EnumerationState>>;

    /// End the session on the server
    async fn disconnect(&self) -> Result<()>;
}

/// Run a remote call with an upper time bound
pub async fn with_timeout<T, F>(timeout: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(PolarionError::remote_timeout(operation, timeout)),
    }
}

/// Scoped owner of a live session
///
/// Call [`SessionGuard::close`] on every exit path. A guard dropped without
/// `close` (panic, cancelled future) still ends the session in a background
/// task on the current runtime.
pub struct SessionGuard {
    session: Arc<dyn TrackerSession>,
    timeout: Duration,
    closed: bool,
}

impl SessionGuard {
    pub fn new(session: Box<dyn TrackerSession>, timeout: Duration) -> Self {
        Self {
            session: Arc::from(session),
            timeout,
            closed: false,
        }
    }

    /// Connect through `connector` and wrap the resulting session
    ///
    /// The login is bounded by `timeout`. When it expires the connect future
    /// is dropped, so a session the server created after accepting the
    /// credentials has no handle here and is left to expire on the server.
    /// Connectors whose transport enforces the same timeout, such as
    /// `SoapConnector`, normally fail first with their own error.
    pub async fn open(
        connector: &dyn TrackerConnector,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        debug!("Connecting as: {}", credentials.username);
        let session = with_timeout(timeout, "logIn", connector.connect(credentials)).await?;
        debug!("Connected to Polarion server");
        Ok(Self::new(session, timeout))
    }

    pub fn session(&self) -> &dyn TrackerSession {
        self.session.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Disconnect; failures are logged and never returned
    pub async fn close(mut self) {
        self.closed = true;
        match with_timeout(self.timeout, "endSession", self.session.disconnect()).await {
            Ok(()) => info!("Disconnected from Polarion server"),
            Err(e) => warn!("Failed to disconnect from Polarion server: {}", e),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let session = Arc::clone(&self.session);
        let timeout = self.timeout;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Session dropped without explicit disconnect, ending it in the background");
                handle.spawn(async move {
                    if let Err(e) = with_timeout(timeout, "endSession", session.disconnect()).await
                    {
                        warn!("Background disconnect failed: {}", e);
                    }
                });
            }
            Err(_) => warn!("Session dropped outside a runtime; it was not ended on the server"),
        }
    }
}
