//! # polarion-metrics
//!
//! Polls a Polarion server over its SOAP web services, counts defects by
//! severity (unresolved) and resolution (resolved), and stores one measure per
//! axis with a zero-filled distribution in server enumeration order.
//!
//! ## Usage
//!
//! ```bash
//! polarion-metrics [-c polarion.toml] analyze [--project id] [--url url]
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Tracker session traits, scoped session guard, call timeouts
//! - `cli` - Argument parsing and command handlers
//! - `config` - Layered configuration (TOML file, environment, flags)
//! - `error` - Unified error type with codes and exit codes
//! - `metrics` - Aggregation, distribution payloads, measure reporting and storage
//! - `model` - Defect records, enumeration states and axes
//! - `sensor` - Defect fetcher, enumeration resolver and the analysis run
//! - `soap` - reqwest/quick-xml transport for the Polarion web services
//! - `testing` - Scripted tracker and in-memory store for tests
pub mod abstractions;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod sensor;
pub mod soap;

pub mod testing;
