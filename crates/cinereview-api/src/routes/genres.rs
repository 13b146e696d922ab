//! Genre catalog routes. Reads are public; writes need the admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use cinereview_catalog::domain::commands::SaveGenre;
use cinereview_catalog::domain::genre::Genre;
use tracing::instrument;
use uuid::Uuid;

use super::ListResponse;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /genres
async fn list_genres(State(state): State<AppState>) -> Result<Json<ListResponse<Genre>>, ApiError> {
    let data = state.genres.list().await?;
    Ok(Json(ListResponse { data }))
}

/// GET /genres/{id}
async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Genre>, ApiError> {
    Ok(Json(state.genres.get(id).await?))
}

/// POST /genres
#[instrument(skip_all, fields(admin_id = %admin.0.id))]
async fn create_genre(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<SaveGenre>,
) -> Result<(StatusCode, Json<Genre>), ApiError> {
    let genre = state.genres.create(&request).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// PUT /genres/{id}
#[instrument(skip_all, fields(genre_id = %id))]
async fn update_genre(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveGenre>,
) -> Result<Json<Genre>, ApiError> {
    Ok(Json(state.genres.update(id, &request).await?))
}

/// DELETE /genres/{id}
#[instrument(skip_all, fields(genre_id = %id))]
async fn delete_genre(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.genres.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the genre router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route(
            "/genres/{id}",
            get(get_genre).put(update_genre).delete(delete_genre),
        )
}
