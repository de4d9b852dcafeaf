//! reqwest-backed implementation of the tracker traits

use super::envelope::{check_fault, response_element, RequestBody, Service};
use super::xml::{parse_document, XmlNode};
use crate::abstractions::{Credentials, ProjectInfo, TrackerConnector, TrackerSession};
use crate::error::{common, ErrorCode, PolarionError, Result};
use crate::model::{DefectRecord, EnumerationState};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Path of the web services below the server base URL
pub const SERVICES_PATH: &str = "polarion/ws/services";

struct Transport {
    client: reqwest::Client,
    services_url: String,
    timeout: Duration,
}

impl Transport {
    fn endpoint(&self, service: Service) -> String {
        format!("{}/{}", self.services_url, service.endpoint_name())
    }

    async fn call(&self, body: &RequestBody, session_id: Option<&str>) -> Result<XmlNode> {
        let operation = body.operation();
        let endpoint = self.endpoint(body.service());
        trace!("POST {} ({})", endpoint, operation);

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(body.to_envelope(session_id))
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        // Faults arrive with HTTP 500, so parse before judging the status.
        let envelope = match parse_document(&text) {
            Ok(envelope) => envelope,
            Err(e) if !status.is_success() => {
                return Err(PolarionError::remote_with_code(
                    ErrorCode::REMOTE_HTTP_STATUS,
                    format!("HTTP {} from {}", status, endpoint),
                    Some(operation.to_string()),
                )
                .with_source(e))
            }
            Err(e) => return Err(e.with_context(format!("in {} response", operation))),
        };
        check_fault(operation, &envelope)?;

        if !status.is_success() {
            return Err(PolarionError::remote_with_code(
                ErrorCode::REMOTE_HTTP_STATUS,
                format!("HTTP {} from {}", status, endpoint),
                Some(operation.to_string()),
            ));
        }
        Ok(envelope)
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> PolarionError {
        if err.is_timeout() {
            PolarionError::remote_timeout(operation, self.timeout)
        } else {
            PolarionError::from(err).with_context(format!("during {}", operation))
        }
    }
}

/// Opens sessions against `<server>/polarion/ws/services/`
pub struct SoapConnector {
    transport: Arc<Transport>,
}

impl SoapConnector {
    /// Validate `server_url` and prepare the HTTP client
    ///
    /// # Errors
    ///
    /// A configuration error when the URL does not parse or is not http(s).
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(server_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PolarionError::config_with_code(
                ErrorCode::CONFIG_INVALID_URL,
                format!("Unsupported URL scheme '{}' in {}", parsed.scheme(), server_url),
                Some("server_url".to_string()),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PolarionError::other("Failed to build HTTP client").with_source(e))?;

        Ok(Self {
            transport: Arc::new(Transport {
                client,
                services_url: format!("{}/{}", server_url.trim_end_matches('/'), SERVICES_PATH),
                timeout,
            }),
        })
    }

    pub fn services_url(&self) -> &str {
        &self.transport.services_url
    }
}

#[async_trait]
impl TrackerConnector for SoapConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn TrackerSession>> {
        let body = RequestBody::new(Service::Session, "logIn")
            .param("userName", &credentials.username)
            .param("password", &credentials.password);

        let envelope = self
            .transport
            .call(&body, None)
            .await
            .map_err(login_error)?;
        let session_id = parse_session_id(&envelope)?;
        debug!("Logged in as {}", credentials.username);

        Ok(Box::new(SoapSession {
            transport: Arc::clone(&self.transport),
            session_id,
        }))
    }
}

fn login_error(err: PolarionError) -> PolarionError {
    let code = match err.code() {
        ErrorCode::REMOTE_FAULT => ErrorCode::AUTH_REJECTED,
        ErrorCode::REMOTE_TRANSPORT | ErrorCode::REMOTE_HTTP_STATUS => ErrorCode::AUTH_UNREACHABLE,
        _ => return err,
    };
    let message = if code == ErrorCode::AUTH_REJECTED {
        "Polarion server rejected the login"
    } else {
        "Polarion web services are not available"
    };
    PolarionError::authentication_with_code(code, message).with_source(err)
}

/// Session id from the `sessionID` header element of a `logIn` response
pub fn parse_session_id(envelope: &XmlNode) -> Result<String> {
    envelope
        .find("sessionID")
        .map(|node| node.text().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            PolarionError::authentication_with_code(
                ErrorCode::AUTH_NO_SESSION_ID,
                "logIn response carried no session id",
            )
        })
}

/// Live session carrying its id in every request header
pub struct SoapSession {
    transport: Arc<Transport>,
    session_id: String,
}

impl SoapSession {
    async fn call(&self, body: RequestBody) -> Result<XmlNode> {
        self.transport.call(&body, Some(&self.session_id)).await
    }
}

#[async_trait]
impl TrackerSession for SoapSession {
    async fn get_project(&self, project_id: &str) -> Result<ProjectInfo> {
        let envelope = self
            .call(RequestBody::new(Service::Project, "getProject").param("projectId", project_id))
            .await?;
        parse_project(project_id, &envelope)
    }

    async fn query_work_items(
        &self,
        query: &str,
        fields: &[&str],
    ) -> Result<Option<Vec<DefectRecord>>> {
        let body = RequestBody::new(Service::Tracker, "queryWorkItems")
            .param("query", query)
            .param("sort", "id")
            .array_param("fields", fields);
        let envelope = self.call(body).await?;
        parse_work_items(&envelope)
    }

    async fn enum_options(
        &self,
        project_id: &str,
        enum_key: &str,
        item_type: &str,
    ) -> Result<Vec<EnumerationState>> {
        let body = RequestBody::new(Service::Tracker, "getEnumOptionsForKeyWithControl")
            .param("projectId", project_id)
            .param("enumKey", enum_key)
            .param("controlKey", item_type);
        let envelope = self.call(body).await?;
        parse_enum_options(&envelope)
    }

    async fn disconnect(&self) -> Result<()> {
        self.call(RequestBody::new(Service::Session, "endSession"))
            .await
            .map(|_| ())
    }
}

/// Elements returned by an operation
///
/// Arrays come either as repeated `<op>Return` elements or as one wrapper
/// holding `item` children. `None` when the response has no non-nil return.
fn returned_items<'a>(operation: &str, response: &'a XmlNode) -> Option<Vec<&'a XmlNode>> {
    let tag = format!("{}Return", operation);
    let returns: Vec<&XmlNode> = response
        .children
        .iter()
        .filter(|c| c.name == tag && !c.is_nil())
        .collect();
    if returns.is_empty() {
        return None;
    }

    let wrapped: Vec<&XmlNode> = returns
        .iter()
        .copied()
        .flat_map(|r| r.children_named("item"))
        .collect();
    if !wrapped.is_empty() {
        return Some(wrapped.into_iter().filter(|i| !i.is_nil()).collect());
    }

    Some(
        returns
            .into_iter()
            .filter(|r| !r.children.is_empty() || !r.attributes.is_empty())
            .collect(),
    )
}

pub fn parse_project(project_id: &str, envelope: &XmlNode) -> Result<ProjectInfo> {
    let response = response_element("getProject", envelope)?;
    let project = response
        .child("getProjectReturn")
        .filter(|p| !p.is_nil())
        .ok_or_else(|| common::malformed_response("getProject", "missing getProjectReturn"))?;

    Ok(ProjectInfo {
        id: project.value_of("id").unwrap_or_else(|| project_id.to_string()),
        name: project.value_of("name"),
        unresolvable: project
            .value_of("unresolvable")
            .is_some_and(|v| v.eq_ignore_ascii_case("true")),
    })
}

/// Enum-valued fields are `EnumOptionId` elements carrying an `id`
fn enum_id(item: &XmlNode, field: &str) -> Option<String> {
    item.child(field)
        .filter(|f| !f.is_nil())
        .and_then(|f| f.value_of("id").or_else(|| Some(f.text().to_string())))
        .filter(|id| !id.is_empty())
}

fn parse_work_item(item: &XmlNode) -> Result<DefectRecord> {
    let id = item
        .value_of("id")
        .ok_or_else(|| common::malformed_response("queryWorkItems", "work item without id"))?;

    Ok(DefectRecord {
        id,
        title: item.value_of("title"),
        severity: enum_id(item, "severity"),
        resolution: enum_id(item, "resolution"),
        priority: enum_id(item, "priority"),
        status: enum_id(item, "status"),
    })
}

pub fn parse_work_items(envelope: &XmlNode) -> Result<Option<Vec<DefectRecord>>> {
    let response = response_element("queryWorkItems", envelope)?;
    match returned_items("queryWorkItems", response) {
        Some(items) => items
            .into_iter()
            .map(parse_work_item)
            .collect::<Result<Vec<_>>>()
            .map(Some),
        None => Ok(None),
    }
}

pub fn parse_enum_options(envelope: &XmlNode) -> Result<Vec<EnumerationState>> {
    let operation = "getEnumOptionsForKeyWithControl";
    let response = response_element(operation, envelope)?;
    let items = returned_items(operation, response).unwrap_or_default();

    items
        .into_iter()
        .map(|item| {
            let id = item
                .value_of("id")
                .ok_or_else(|| common::malformed_response(operation, "enum option without id"))?;
            let name = item.value_of("name").unwrap_or_else(|| id.clone());
            Ok(EnumerationState::new(id, name))
        })
        .collect()
}
