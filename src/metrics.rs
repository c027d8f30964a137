//! Prometheus metrics for upstream fetches and request outcomes.
//!
//! This module provides:
//! - ZwiftPower login latency and failures
//! - Fetch latency per record kind
//! - API request outcomes per record kind

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use strum::AsRefStr;
use tracing::debug;

use crate::zwiftpower::RecordKind;

// === Metric Name Constants ===

/// ZwiftPower login latency metric name.
pub const METRIC_LOGIN_LATENCY: &str = "zwiftpower_login_latency_ms";
/// ZwiftPower login failures counter metric name.
pub const METRIC_LOGIN_FAILURES: &str = "zwiftpower_login_failures_total";
/// Fetch latency metric name.
pub const METRIC_FETCH_LATENCY: &str = "zwiftpower_fetch_latency_ms";
/// API lookups counter metric name.
pub const METRIC_LOOKUPS: &str = "api_lookups_total";

/// Result of a single API lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LookupOutcome {
    /// Record returned.
    Found,
    /// Id absent upstream.
    NotFound,
    /// Fetch failed.
    Error,
}

/// Initialize all metric descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_LOGIN_LATENCY,
        "ZwiftPower single sign-on latency in milliseconds"
    );
    describe_histogram!(
        METRIC_FETCH_LATENCY,
        "ZwiftPower fetch latency in milliseconds, including login"
    );
    describe_counter!(
        METRIC_LOGIN_FAILURES,
        "Total number of rejected ZwiftPower logins"
    );
    describe_counter!(
        METRIC_LOOKUPS,
        "Total number of API lookups by record kind and outcome"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and describe all metrics.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record login latency.
pub fn record_login_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_LOGIN_LATENCY).record(latency_ms);
}

/// Increment login failures counter.
pub fn inc_login_failures() {
    counter!(METRIC_LOGIN_FAILURES).increment(1);
}

/// Increment lookup counter for `kind` and `outcome`.
pub fn inc_lookup(kind: RecordKind, outcome: LookupOutcome) {
    counter!(
        METRIC_LOOKUPS,
        "kind" => kind.as_ref().to_string(),
        "outcome" => outcome.as_ref().to_string()
    )
    .increment(1);
}

/// RAII guard for timing fetches.
/// Automatically records latency when dropped.
pub struct FetchTimer {
    start: Instant,
    kind: RecordKind,
}

impl FetchTimer {
    /// Start timing a fetch of `kind`.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            start: Instant::now(),
            kind,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        histogram!(METRIC_FETCH_LATENCY, "kind" => self.kind.as_ref().to_string())
            .record(self.elapsed_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn fetch_timer_measures_time() {
        let timer = FetchTimer::new(RecordKind::Rider);
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
    }

    #[test]
    fn lookup_outcome_labels() {
        assert_eq!(LookupOutcome::Found.as_ref(), "found");
        assert_eq!(LookupOutcome::NotFound.as_ref(), "not_found");
        assert_eq!(LookupOutcome::Error.as_ref(), "error");
    }
}
