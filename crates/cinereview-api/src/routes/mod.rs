//! Route modules, one per resource.

pub mod admin;
pub mod auth;
pub mod genres;
pub mod health;
pub mod movies;
pub mod reviews;
pub mod users;

use axum::Router;
use cinereview_core::pagination::PageRequest;
use serde::Serialize;

use crate::state::AppState;

/// Every `/api/v1` route.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(genres::router())
        .merge(movies::router())
        .merge(reviews::router())
        .merge(users::router())
        .merge(admin::router())
}

/// Unpaginated list envelope.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// Raw `page`/`limit` query values; services normalize them.
pub(crate) fn page_request(page: Option<i64>, limit: Option<i64>) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), limit.unwrap_or(0))
}
