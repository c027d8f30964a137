//! Zwift racing API.
//!
//! A small HTTP service that serves ZwiftPower rider and team data as JSON.
//! ZwiftPower credentials are read from the system keyring at startup; each
//! request signs in, fetches one document, and forwards it unchanged.
//!
//! ```text
//! GET /rider/{zwift_id}        -> rider profile
//! GET /team/{team_id}          -> team document
//! GET /team/{team_id}/riders   -> team rider entries
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`credentials`]: Secrets store access
//! - [`zwiftpower`]: ZwiftPower client and record types
//! - [`api`]: HTTP API
//! - [`metrics`]: Prometheus metrics
//! - [`startup`]: Fatal startup checks
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod metrics;
pub mod startup;
pub mod utils;
pub mod zwiftpower;

pub use config::Config;
pub use error::{Result, ServiceError};
