//! ZwiftPower data fetching.
//!
//! This module handles:
//! - Rider and team record types
//! - The ZwiftPower HTTP client (SSO login plus JSON endpoints)
//! - Mock fetcher for testing

pub mod client;
pub mod mock;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FetchError;

pub use client::ZwiftPowerClient;
pub use mock::{MockConfig, MockZwiftFetch};
pub use types::{RecordKind, Rider, Team};

/// Source of rider and team records.
///
/// Results are keyed by the requested id; ids with no upstream record are
/// simply absent from the map.
#[async_trait]
pub trait ZwiftFetch: Send + Sync {
    /// Fetch rider profiles by Zwift id.
    async fn fetch_riders(&self, ids: &[i64]) -> Result<HashMap<i64, Rider>, FetchError>;

    /// Fetch team rosters by ZwiftPower team id.
    async fn fetch_teams(&self, ids: &[i64]) -> Result<HashMap<i64, Team>, FetchError>;
}
