//! `PostgreSQL` implementation of the `ReviewStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use cinereview_reviews::domain::review::{NewReview, Review, ReviewFilters, ReviewSort};
use cinereview_reviews::ports::ReviewStore;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::error::{infrastructure, map_conflict};

const REVIEW_COLUMNS: &str = "id, movie_id, user_id, rating, title, content, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    movie_id: Uuid,
    user_id: Uuid,
    rating: i32,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            movie_id: row.movie_id,
            user_id: row.user_id,
            rating: row.rating,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn order_by(sort: ReviewSort) -> &'static str {
    match sort {
        ReviewSort::RatingDesc => "rating DESC, created_at DESC, id DESC",
        ReviewSort::RatingAsc => "rating ASC, created_at DESC, id DESC",
        ReviewSort::CreatedDesc => "created_at DESC, id DESC",
        ReviewSort::CreatedAsc => "created_at ASC, id ASC",
    }
}

/// PostgreSQL-backed review store.
#[derive(Debug, Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Creates a new `PgReviewRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(
        &self,
        column: &'static str,
        id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE "));
        query.push(column).push(" = ").push_bind(id);
        if let Some(min) = filters.min_rating {
            query.push(" AND rating >= ").push_bind(min);
        }
        if let Some(max) = filters.max_rating {
            query.push(" AND rating <= ").push_bind(max);
        }
        query
            .push(" ORDER BY ")
            .push(order_by(filters.sort))
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ReviewRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }
}

#[async_trait]
impl ReviewStore for PgReviewRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let row: Option<ReviewRow> =
            sqlx::query_as(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        Ok(row.map(Review::from))
    }

    async fn get_by_movie_and_author(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Review>, DomainError> {
        let row: Option<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE movie_id = $1 AND user_id = $2"
        ))
        .bind(movie_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(Review::from))
    }

    async fn create(&self, review: &NewReview) -> Result<Review, DomainError> {
        let row: ReviewRow = sqlx::query_as(&format!(
            "INSERT INTO reviews (id, movie_id, user_id, rating, title, content) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(review.movie_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_conflict(e, || DomainError::ReviewAlreadyExists {
                movie_id: review.movie_id,
                user_id: review.user_id,
            })
        })?;

        debug!(review_id = %row.id, "review row inserted");
        Ok(row.into())
    }

    async fn update(&self, review: &Review) -> Result<Review, DomainError> {
        let row: Option<ReviewRow> = sqlx::query_as(&format!(
            "UPDATE reviews SET rating = $2, title = $3, content = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.map(Review::from)
            .ok_or(DomainError::ReviewNotFound(review.id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn list_by_movie(
        &self,
        movie_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        self.list_where("movie_id", movie_id, filters, page).await
    }

    async fn list_by_author(
        &self,
        user_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        self.list_where("user_id", user_id, filters, page).await
    }

    async fn count_by_author(&self, user_id: Uuid) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)
    }
}
