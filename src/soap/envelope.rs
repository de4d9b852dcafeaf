//! SOAP 1.1 request envelopes for the Polarion web services

use super::xml::{escape, XmlNode};
use crate::error::{common, Result};

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SESSION_HEADER_NS: &str = "http://ws.polarion.com/session";

/// One of the Polarion web service endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Session,
    Tracker,
    Project,
}

impl Service {
    pub fn endpoint_name(self) -> &'static str {
        match self {
            Service::Session => "SessionWebService",
            Service::Tracker => "TrackerWebService",
            Service::Project => "ProjectWebService",
        }
    }

    pub fn namespace(self) -> &'static str {
        match self {
            Service::Session => "http://ws.polarion.com/SessionWebService-impl",
            Service::Tracker => "http://ws.polarion.com/TrackerWebService-impl",
            Service::Project => "http://ws.polarion.com/ProjectWebService-impl",
        }
    }
}

/// Operation body under construction
pub struct RequestBody {
    service: Service,
    operation: String,
    params: Vec<(String, String)>,
}

impl RequestBody {
    pub fn new(service: Service, operation: impl Into<String>) -> Self {
        Self {
            service,
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.to_string(), value.to_string()));
        self
    }

    /// Repeat `name` once per value, the doc/literal encoding of an array
    pub fn array_param(mut self, name: &str, values: &[&str]) -> Self {
        for value in values {
            self.params.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Full envelope, with the session header when `session_id` is given
    pub fn to_envelope(&self, session_id: Option<&str>) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push_str(&format!(
            r#"<soapenv:Envelope xmlns:soapenv="{}" xmlns:ns="{}">"#,
            SOAP_ENV_NS,
            self.service.namespace()
        ));

        match session_id {
            Some(id) => xml.push_str(&format!(
                r#"<soapenv:Header><ses:sessionID xmlns:ses="{}" soapenv:mustUnderstand="0">{}</ses:sessionID></soapenv:Header>"#,
                SESSION_HEADER_NS,
                escape(id)
            )),
            None => xml.push_str("<soapenv:Header/>"),
        }

        xml.push_str("<soapenv:Body>");
        xml.push_str(&format!("<ns:{}>", self.operation));
        for (name, value) in &self.params {
            xml.push_str(&format!("<ns:{0}>{1}</ns:{0}>", name, escape(value)));
        }
        xml.push_str(&format!("</ns:{}>", self.operation));
        xml.push_str("</soapenv:Body></soapenv:Envelope>");
        xml
    }
}

/// Fail with the server's fault string when the envelope carries a fault
pub fn check_fault(operation: &str, envelope: &XmlNode) -> Result<()> {
    match envelope.find("Fault") {
        Some(fault) => {
            let message = fault
                .child("faultstring")
                .map(|f| f.text().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "unspecified SOAP fault".to_string());
            Err(common::soap_fault(operation, &message))
        }
        None => Ok(()),
    }
}

/// The `<operation>Response` element of the body
pub fn response_element<'a>(operation: &str, envelope: &'a XmlNode) -> Result<&'a XmlNode> {
    let body = envelope
        .child("Body")
        .ok_or_else(|| common::malformed_response(operation, "missing SOAP body"))?;
    let name = format!("{}Response", operation);
    body.child(&name)
        .ok_or_else(|| common::malformed_response(operation, format!("missing {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::soap::xml::parse_document;

    #[test]
    fn test_envelope_with_session_header() {
        let body = RequestBody::new(Service::Tracker, "queryWorkItems")
            .param("query", "type:defect AND resolved AND project.id:a&b")
            .param("sort", "id")
            .array_param("fields", &["id", "severity"]);

        let xml = body.to_envelope(Some("42"));

        assert!(xml.contains(r#"xmlns:ns="http://ws.polarion.com/TrackerWebService-impl""#));
        assert!(xml.contains(">42</ses:sessionID>"));
        assert!(xml.contains("<ns:query>type:defect AND resolved AND project.id:a&amp;b</ns:query>"));
        assert!(xml.contains("<ns:fields>id</ns:fields><ns:fields>severity</ns:fields>"));
        assert!(parse_document(&xml).is_ok());
    }

    #[test]
    fn test_login_envelope_has_no_session() {
        let xml = RequestBody::new(Service::Session, "logIn")
            .param("userName", "admin")
            .param("password", "pwd")
            .to_envelope(None);
        assert!(xml.contains("<soapenv:Header/>"));
        assert!(!xml.contains("sessionID"));
    }

    #[test]
    fn test_fault_detection() {
        let doc = parse_document(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
<soapenv:Body><soapenv:Fault><faultcode>soapenv:Server</faultcode>
<faultstring>Unknown enumeration</faultstring></soapenv:Fault></soapenv:Body>
</soapenv:Envelope>"#,
        )
        .unwrap();

        let err = check_fault("getEnumOptionsForKeyWithControl", &doc).unwrap_err();
        assert_eq!(err.code(), ErrorCode::REMOTE_FAULT);
        assert!(err.to_string().contains("Unknown enumeration"));
    }

    #[test]
    fn test_missing_response_element() {
        let doc = parse_document(
            r#"<Envelope><Body><otherResponse/></Body></Envelope>"#,
        )
        .unwrap();
        let err = response_element("getProject", &doc).unwrap_err();
        assert_eq!(err.code(), ErrorCode::REMOTE_MALFORMED_RESPONSE);
    }
}
