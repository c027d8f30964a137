//! Mock ZwiftPower fetcher for unit testing.
//!
//! This module provides a fetcher that serves seeded records without making
//! network requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

use super::types::{Rider, Team};
use super::ZwiftFetch;

/// Configuration for mock fetcher behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Fail every fetch with this message.
    pub failure: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock fetcher for testing.
#[derive(Debug, Clone, Default)]
pub struct MockZwiftFetch {
    config: MockConfig,
    riders: Arc<Mutex<HashMap<i64, Value>>>,
    teams: Arc<Mutex<HashMap<i64, Value>>>,
    calls: Arc<AtomicUsize>,
}

impl MockZwiftFetch {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock fetcher with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a mock fetcher whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig {
            failure: Some(message.into()),
            ..MockConfig::default()
        })
    }

    /// Seed a rider document.
    pub fn insert_rider(&self, zwift_id: i64, raw: Value) {
        self.riders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(zwift_id, raw);
    }

    /// Seed a team document.
    pub fn insert_team(&self, team_id: i64, raw: Value) {
        self.teams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(team_id, raw);
    }

    /// Number of fetch calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        match &self.config.failure {
            Some(message) => Err(FetchError::Upstream(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ZwiftFetch for MockZwiftFetch {
    async fn fetch_riders(&self, ids: &[i64]) -> Result<HashMap<i64, Rider>, FetchError> {
        self.begin().await?;

        let riders = self.riders.lock().unwrap_or_else(|e| e.into_inner());
        Ok(ids
            .iter()
            .filter_map(|id| riders.get(id).map(|raw| (*id, Rider::new(*id, raw.clone()))))
            .collect())
    }

    async fn fetch_teams(&self, ids: &[i64]) -> Result<HashMap<i64, Team>, FetchError> {
        self.begin().await?;

        let teams = self.teams.lock().unwrap_or_else(|e| e.into_inner());
        Ok(ids
            .iter()
            .filter_map(|id| teams.get(id).map(|raw| (*id, Team::new(*id, raw.clone()))))
            .collect())
    }
}
