//! SOAP transport for the Polarion web services
//!
//! Implements [`TrackerConnector`](crate::abstractions::TrackerConnector) and
//! [`TrackerSession`](crate::abstractions::TrackerSession) over HTTP with
//! hand-built envelopes. Faults on `logIn` surface as authentication errors,
//! faults on every other operation as remote lookup errors.

pub mod client;
pub mod envelope;
pub mod xml;

pub use client::{SoapConnector, SoapSession, SERVICES_PATH};
pub use envelope::{RequestBody, Service};
