//! Aggregate queries behind the profile and admin dashboards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_accounts::domain::stats::{AdminStats, FavoriteGenre, UserStats};
use cinereview_accounts::ports::StatsReader;
use cinereview_core::error::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::infrastructure;

#[derive(sqlx::FromRow)]
struct AdminStatsRow {
    total_users: i64,
    total_movies: i64,
    total_reviews: i64,
    total_genres: i64,
    average_rating: f64,
    users_last_7_days: i64,
    reviews_last_7_days: i64,
    movies_last_7_days: i64,
}

impl From<AdminStatsRow> for AdminStats {
    fn from(row: AdminStatsRow) -> Self {
        Self {
            total_users: row.total_users,
            total_movies: row.total_movies,
            total_reviews: row.total_reviews,
            total_genres: row.total_genres,
            average_rating: row.average_rating,
            users_last_7_days: row.users_last_7_days,
            reviews_last_7_days: row.reviews_last_7_days,
            movies_last_7_days: row.movies_last_7_days,
        }
    }
}

/// PostgreSQL-backed stats reader.
#[derive(Debug, Clone)]
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    /// Creates a new `PgStatsRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsReader for PgStatsRepository {
    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, DomainError> {
        let average_rating: f64 = sqlx::query_scalar(
            "SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION FROM reviews WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;

        // Ties go to the alphabetically first genre.
        let favorite_genre: Option<(Uuid, String)> = sqlx::query_as(
            "SELECT g.id, g.name \
             FROM genres g \
             JOIN movie_genres mg ON mg.genre_id = g.id \
             JOIN reviews r ON r.movie_id = mg.movie_id \
             WHERE r.user_id = $1 \
             GROUP BY g.id, g.name \
             ORDER BY COUNT(*) DESC, g.name \
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(UserStats {
            average_rating,
            favorite_genre: favorite_genre.map(|(id, name)| FavoriteGenre { id, name }),
        })
    }

    async fn admin_stats(&self, since: DateTime<Utc>) -> Result<AdminStats, DomainError> {
        let row: AdminStatsRow = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM users) AS total_users, \
               (SELECT COUNT(*) FROM movies) AS total_movies, \
               (SELECT COUNT(*) FROM reviews) AS total_reviews, \
               (SELECT COUNT(*) FROM genres) AS total_genres, \
               (SELECT COALESCE(AVG(average_rating), 0)::DOUBLE PRECISION \
                  FROM movies WHERE average_rating > 0) AS average_rating, \
               (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS users_last_7_days, \
               (SELECT COUNT(*) FROM reviews WHERE created_at >= $1) AS reviews_last_7_days, \
               (SELECT COUNT(*) FROM movies WHERE created_at >= $1) AS movies_last_7_days",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.into())
    }
}
