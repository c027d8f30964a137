//! OpenAPI document for the HTTP API.

use utoipa::OpenApi;

use super::error::ErrorBody;
use super::handlers::{self, HealthResponse};

/// OpenAPI description served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Zwift Racing API",
        description = "Rider and team data from ZwiftPower"
    ),
    paths(
        handlers::health,
        handlers::get_rider,
        handlers::get_team,
        handlers::get_team_riders
    ),
    components(schemas(ErrorBody, HealthResponse))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Zwift Racing API");

        for path in ["/health", "/rider/{zwift_id}", "/team/{team_id}", "/team/{team_id}/riders"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
