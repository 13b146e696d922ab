//! Movie catalog routes. Reads are public; writes need the admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use cinereview_catalog::domain::commands::{CreateMovie, UpdateMovie};
use cinereview_catalog::domain::movie::{Movie, MovieFilters};
use cinereview_core::pagination::Paginated;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::page_request;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /movies.
#[derive(Debug, Default, Deserialize)]
pub struct MovieQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Genre name substring.
    pub genre: Option<String>,
    pub genre_id: Option<Uuid>,
    pub year: Option<i32>,
    pub min_rating: Option<f64>,
    /// Title or description substring.
    pub search: Option<String>,
}

/// GET /movies
async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<Paginated<Movie>>, ApiError> {
    let filters = MovieFilters {
        genre: query.genre.filter(|g| !g.is_empty()),
        genre_id: query.genre_id,
        year: query.year.filter(|y| *y != 0),
        min_rating: query.min_rating.filter(|r| *r > 0.0),
        search: query.search.filter(|s| !s.is_empty()),
    };
    let page = state
        .movies
        .list(&filters, page_request(query.page, query.limit))
        .await?;
    Ok(Json(page))
}

/// GET /movies/{id}
async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Movie>, ApiError> {
    Ok(Json(state.movies.get(id).await?))
}

/// POST /movies
#[instrument(skip_all, fields(title = %request.title))]
async fn create_movie(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CreateMovie>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    let movie = state.movies.create(&request).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// PUT /movies/{id}
#[instrument(skip_all, fields(movie_id = %id))]
async fn update_movie(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMovie>,
) -> Result<Json<Movie>, ApiError> {
    Ok(Json(state.movies.update(id, &request).await?))
}

/// DELETE /movies/{id}
#[instrument(skip_all, fields(movie_id = %id))]
async fn delete_movie(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.movies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the movie router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/{id}",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
}
