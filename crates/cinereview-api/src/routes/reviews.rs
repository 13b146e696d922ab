//! Review routes: public listings plus authenticated create, update and
//! delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::put};
use cinereview_reviews::domain::commands::{CreateReview, UpdateReview};
use cinereview_reviews::domain::review::{Review, ReviewFilters, ReviewSort};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ListResponse, page_request};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Query string for review listings.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    /// `rating_desc`, `rating_asc`, `created_desc` or `created_asc`.
    pub sort: Option<String>,
}

impl ReviewQuery {
    fn filters(&self) -> ReviewFilters {
        ReviewFilters {
            min_rating: self.min_rating.filter(|r| *r > 0),
            max_rating: self.max_rating.filter(|r| *r > 0),
            sort: ReviewSort::parse(self.sort.as_deref()),
        }
    }
}

/// GET /movies/{id}/reviews
async fn list_movie_reviews(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ListResponse<Review>>, ApiError> {
    let data = state
        .reviews
        .list_by_movie(movie_id, &query.filters(), page_request(query.page, query.limit))
        .await?;
    Ok(Json(ListResponse { data }))
}

/// GET /users/{id}/reviews
async fn list_user_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ListResponse<Review>>, ApiError> {
    let data = state
        .reviews
        .list_by_user(user_id, &query.filters(), page_request(query.page, query.limit))
        .await?;
    Ok(Json(ListResponse { data }))
}

/// GET /me/reviews
async fn list_my_reviews(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ListResponse<Review>>, ApiError> {
    let data = state
        .reviews
        .list_by_user(user.id, &query.filters(), page_request(query.page, query.limit))
        .await?;
    Ok(Json(ListResponse { data }))
}

/// POST /movies/{id}/reviews
#[instrument(skip_all, fields(movie_id = %movie_id, user_id = %user.id))]
async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
    Json(request): Json<CreateReview>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    info!("handling create_review request");
    let review = state.reviews.create(movie_id, user.id, &request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /reviews/{id}
#[instrument(skip_all, fields(review_id = %review_id, user_id = %user.id))]
async fn update_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(request): Json<UpdateReview>,
) -> Result<Json<Review>, ApiError> {
    info!("handling update_review request");
    Ok(Json(
        state.reviews.update(review_id, user.id, &request).await?,
    ))
}

/// DELETE /reviews/{id}
#[instrument(skip_all, fields(review_id = %review_id, user_id = %user.id))]
async fn delete_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!(is_admin = user.is_admin(), "handling delete_review request");
    state
        .reviews
        .delete(review_id, user.id, user.is_admin())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the review router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/movies/{id}/reviews",
            get(list_movie_reviews).post(create_review),
        )
        .route("/reviews/{id}", put(update_review).delete(delete_review))
        .route("/users/{id}/reviews", get(list_user_reviews))
        .route("/me/reviews", get(list_my_reviews))
}
