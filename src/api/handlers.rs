//! HTTP API handlers.

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::metrics::{self, FetchTimer, LookupOutcome};
use crate::zwiftpower::{RecordKind, Team, ZwiftFetch};

use super::error::{ApiError, ErrorBody};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of rider and team records.
    pub fetcher: Arc<dyn ZwiftFetch>,
    /// Prometheus handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state around a fetcher.
    pub fn new(fetcher: Arc<dyn ZwiftFetch>) -> Self {
        Self {
            fetcher,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Prometheus metrics, or 404 when metrics are disabled.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Fetch full profile data for a single rider by Zwift ID.
#[utoipa::path(
    get,
    path = "/rider/{zwift_id}",
    params(("zwift_id" = i64, Path, description = "Zwift account id")),
    responses(
        (status = 200, description = "Rider profile as returned by ZwiftPower"),
        (status = 404, description = "Rider not found", body = ErrorBody),
        (status = 422, description = "Id is not an integer", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn get_rider(
    State(state): State<AppState>,
    zwift_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let zwift_id = path_id(RecordKind::Rider, zwift_id)?;

    let riders = {
        let _timer = FetchTimer::new(RecordKind::Rider);
        state.fetcher.fetch_riders(&[zwift_id]).await
    };
    let riders = riders.inspect_err(|_| lookup_failed(RecordKind::Rider))?;

    let rider = riders
        .get(&zwift_id)
        .ok_or_else(|| not_found(RecordKind::Rider, zwift_id))?;

    metrics::inc_lookup(RecordKind::Rider, LookupOutcome::Found);
    info!(zwift_id, name = rider.name().unwrap_or("?"), "Served rider");
    Ok(Json(rider.as_dict()))
}

/// Fetch full team roster including power data for all members.
#[utoipa::path(
    get,
    path = "/team/{team_id}",
    params(("team_id" = i64, Path, description = "ZwiftPower team id")),
    responses(
        (status = 200, description = "Team document as returned by ZwiftPower"),
        (status = 404, description = "Team not found", body = ErrorBody),
        (status = 422, description = "Id is not an integer", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn get_team(
    State(state): State<AppState>,
    team_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let team_id = path_id(RecordKind::Team, team_id)?;
    let team = lookup_team(&state, team_id).await?;

    info!(team_id, riders = team.rider_count(), "Served team");
    Ok(Json(team.as_dict()))
}

/// Fetch the riders list for a team including power profiles.
#[utoipa::path(
    get,
    path = "/team/{team_id}/riders",
    params(("team_id" = i64, Path, description = "ZwiftPower team id")),
    responses(
        (status = 200, description = "Team rider entries"),
        (status = 404, description = "Team not found", body = ErrorBody),
        (status = 422, description = "Id is not an integer", body = ErrorBody),
        (status = 500, description = "Upstream failure", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn get_team_riders(
    State(state): State<AppState>,
    team_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let team_id = path_id(RecordKind::Team, team_id)?;
    let team = lookup_team(&state, team_id).await?;

    info!(team_id, riders = team.rider_count(), "Served team riders");
    Ok(Json(team.as_list()))
}

async fn lookup_team(state: &AppState, team_id: i64) -> Result<Team, ApiError> {
    let teams = {
        let _timer = FetchTimer::new(RecordKind::Team);
        state.fetcher.fetch_teams(&[team_id]).await
    };
    let mut teams = teams.inspect_err(|_| lookup_failed(RecordKind::Team))?;

    let team = teams
        .remove(&team_id)
        .ok_or_else(|| not_found(RecordKind::Team, team_id))?;

    metrics::inc_lookup(RecordKind::Team, LookupOutcome::Found);
    Ok(team)
}

/// Integer id from the path.
///
/// Any integer literal is accepted, including negative ids; those reach the
/// fetcher and come back absent. Literals beyond `i64` cannot name an
/// upstream record and are answered as not found without fetching.
fn path_id(
    kind: RecordKind,
    raw: Result<Path<String>, PathRejection>,
) -> Result<i64, ApiError> {
    let Path(raw) = raw?;
    let literal = parse_int_literal(&raw).ok_or_else(|| {
        ApiError::InvalidPath(format!(
            "Input should be a valid integer, unable to parse string as an integer: {:?}",
            raw
        ))
    })?;

    literal
        .parse::<i64>()
        .map_err(|_| not_found(kind, &literal))
}

/// Normalize an optionally signed decimal literal: `+` and leading zeros
/// dropped, `-0` folded to `0`. `None` when `raw` is not an integer.
pub(crate) fn parse_int_literal(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = digits.trim_start_matches('0');
    Some(match (negative, digits.is_empty()) {
        (_, true) => "0".to_string(),
        (true, false) => format!("-{}", digits),
        (false, false) => digits.to_string(),
    })
}

fn not_found(kind: RecordKind, id: impl std::fmt::Display) -> ApiError {
    let label = match kind {
        RecordKind::Rider => "Rider",
        RecordKind::Team => "Team",
    };
    let detail = format!("{} {} not found", label, id);

    debug!(%kind, "{}", detail);
    metrics::inc_lookup(kind, LookupOutcome::NotFound);
    ApiError::NotFound(detail)
}

fn lookup_failed(kind: RecordKind) {
    metrics::inc_lookup(kind, LookupOutcome::Error);
}
