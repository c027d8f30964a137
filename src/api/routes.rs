//! HTTP API route definitions.

use axum::http::Method;
use axum::{routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{get_rider, get_team, get_team_riders, health, metrics_text, AppState};
use super::openapi::ApiDoc;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Data endpoints
        .route("/rider/:zwift_id", get(get_rider))
        .route("/team/:team_id", get(get_team))
        .route("/team/:team_id/riders", get(get_team_riders))
        // Operational endpoints
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin, GET only, any header.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use metrics_exporter_prometheus::PrometheusBuilder;

    use crate::metrics::{inc_lookup, LookupOutcome, METRIC_LOOKUPS};
    use crate::zwiftpower::{MockZwiftFetch, RecordKind};

    fn app(fetcher: MockZwiftFetch) -> Router {
        create_router(AppState::new(Arc::new(fetcher)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (status, body) = get_json(app(MockZwiftFetch::new()), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn rider_found_returns_document() {
        let fetcher = MockZwiftFetch::new();
        let doc = json!({"data": [{"name": "Jane Doe", "zwid": 4242}]});
        fetcher.insert_rider(4242, doc.clone());

        let (status, body) = get_json(app(fetcher), "/rider/4242").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, doc);
    }

    #[tokio::test]
    async fn rider_missing_returns_404() {
        let (status, body) = get_json(app(MockZwiftFetch::new()), "/rider/999").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Rider 999 not found"}));
    }

    #[tokio::test]
    async fn non_numeric_id_returns_422() {
        let fetcher = MockZwiftFetch::new();
        let (status, body) = get_json(app(fetcher.clone()), "/rider/abc").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn metrics_disabled_returns_404() {
        let response = app(MockZwiftFetch::new())
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_enabled_renders_prometheus_text() {
        let recorder = PrometheusBuilder::new().build_recorder();
        ::metrics::with_local_recorder(&recorder, || {
            inc_lookup(RecordKind::Rider, LookupOutcome::Found);
        });

        let state = AppState::new(Arc::new(MockZwiftFetch::new())).with_metrics(recorder.handle());
        let response = create_router(state)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains(METRIC_LOOKUPS), "{}", text);
        assert!(text.contains(r#"kind="rider""#), "{}", text);
        assert!(text.contains(r#"outcome="found""#), "{}", text);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = get_json(app(MockZwiftFetch::new()), "/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Zwift Racing API");
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let response = app(MockZwiftFetch::new())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/rider/1")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
