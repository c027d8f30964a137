//! HTTP API module for rider, team, health, and metrics endpoints.

pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;

pub use error::{ApiError, ErrorBody};
pub use handlers::AppState;
pub use openapi::ApiDoc;
pub use routes::create_router;
