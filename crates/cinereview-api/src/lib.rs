//! HTTP surface of the CineReview movie review service.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The full application router: every resource under `/api/v1`, plus
/// `/health` at the root for probes.
pub fn build_app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with configured origins once a
    // frontend host is fixed.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_router())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
