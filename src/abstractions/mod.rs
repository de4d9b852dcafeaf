//! Abstraction layers for external dependencies
//!
//! This module provides trait-based abstractions for the remote tracker
//! to enable better testing and dependency injection.

pub mod tracker;

pub use tracker::{
    with_timeout, Credentials, ProjectInfo, SessionGuard, TrackerConnector, TrackerSession,
};
