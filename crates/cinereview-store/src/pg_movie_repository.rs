//! `PostgreSQL` implementation of the catalog's `MovieRepository` and the
//! review pipeline's `MovieLookup` and `MovieAggregateUpdater` traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_catalog::domain::genre::Genre;
use cinereview_catalog::domain::movie::{Movie, MovieFilters, NewMovie};
use cinereview_catalog::ports::MovieRepository;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use cinereview_reviews::ports::{MovieAggregateUpdater, MovieLookup};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::error::infrastructure;

const MOVIE_COLUMNS: &str = "m.id, m.title, m.description, m.release_year, m.director, \
     m.duration_minutes, m.average_rating, m.created_at, m.updated_at";

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    description: String,
    release_year: i32,
    director: String,
    duration_minutes: i32,
    average_rating: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MovieRow {
    fn into_movie(self, genres: Vec<Genre>) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            description: self.description,
            release_year: self.release_year,
            director: self.director,
            duration_minutes: self.duration_minutes,
            average_rating: self.average_rating,
            genres,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MovieGenreRow {
    movie_id: Uuid,
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &MovieFilters) {
    query.push(" WHERE TRUE");
    if let Some(year) = filters.year {
        query.push(" AND m.release_year = ").push_bind(year);
    }
    if let Some(min) = filters.min_rating {
        query.push(" AND m.average_rating >= ").push_bind(min);
    }
    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        query
            .push(" AND (m.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR m.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(genre_id) = filters.genre_id {
        query
            .push(" AND EXISTS (SELECT 1 FROM movie_genres mg WHERE mg.movie_id = m.id AND mg.genre_id = ")
            .push_bind(genre_id)
            .push(")");
    }
    if let Some(genre) = filters.genre.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM movie_genres mg JOIN genres g ON g.id = mg.genre_id \
                 WHERE mg.movie_id = m.id AND g.name ILIKE ",
            )
            .push_bind(format!("%{genre}%"))
            .push(")");
    }
}

async fn replace_genres(
    conn: &mut PgConnection,
    movie_id: Uuid,
    genre_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM movie_genres WHERE movie_id = $1")
        .bind(movie_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO movie_genres (movie_id, genre_id) \
         SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
    )
    .bind(movie_id)
    .bind(genre_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// PostgreSQL-backed movie repository.
#[derive(Debug, Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    /// Creates a new `PgMovieRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the genres of every movie in `movie_ids` in one round trip,
    /// each list ordered by name.
    async fn genres_for(&self, movie_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Genre>>, DomainError> {
        let rows: Vec<MovieGenreRow> = sqlx::query_as(
            "SELECT mg.movie_id, g.id, g.name, g.created_at \
             FROM movie_genres mg JOIN genres g ON g.id = mg.genre_id \
             WHERE mg.movie_id = ANY($1) \
             ORDER BY g.name",
        )
        .bind(movie_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        let mut by_movie: HashMap<Uuid, Vec<Genre>> = HashMap::new();
        for row in rows {
            by_movie.entry(row.movie_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
            });
        }
        Ok(by_movie)
    }

    async fn attach_genres(&self, rows: Vec<MovieRow>) -> Result<Vec<Movie>, DomainError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut genres = self.genres_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let attached = genres.remove(&row.id).unwrap_or_default();
                row.into_movie(attached)
            })
            .collect())
    }

    async fn fetch(&self, id: Uuid) -> Result<Movie, DomainError> {
        self.get_by_id(id)
            .await?
            .ok_or(DomainError::MovieNotFound(id))
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Movie>, DomainError> {
        let row: Option<MovieRow> =
            sqlx::query_as(&format!("SELECT {MOVIE_COLUMNS} FROM movies m WHERE m.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        match row {
            Some(row) => Ok(self.attach_genres(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filters: &MovieFilters,
        page: PageRequest,
    ) -> Result<(Vec<Movie>, i64), DomainError> {
        let mut count: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM movies m");
        push_filters(&mut count, filters);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)?;

        let mut select: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {MOVIE_COLUMNS} FROM movies m"));
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY m.created_at DESC, m.id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<MovieRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        Ok((self.attach_genres(rows).await?, total))
    }

    async fn create(&self, movie: &NewMovie, genre_ids: &[Uuid]) -> Result<Movie, DomainError> {
        let id = Uuid::now_v7();
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        sqlx::query(
            "INSERT INTO movies (id, title, description, release_year, director, duration_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.release_year)
        .bind(&movie.director)
        .bind(movie.duration_minutes)
        .execute(&mut *tx)
        .await
        .map_err(infrastructure)?;
        replace_genres(&mut tx, id, genre_ids)
            .await
            .map_err(infrastructure)?;

        tx.commit().await.map_err(infrastructure)?;
        debug!(movie_id = %id, genres = genre_ids.len(), "movie row inserted");
        self.fetch(id).await
    }

    async fn update(
        &self,
        movie: &Movie,
        genre_ids: Option<&[Uuid]>,
    ) -> Result<Movie, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        let updated = sqlx::query(
            "UPDATE movies SET title = $2, description = $3, release_year = $4, director = $5, \
             duration_minutes = $6, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.release_year)
        .bind(&movie.director)
        .bind(movie.duration_minutes)
        .execute(&mut *tx)
        .await
        .map_err(infrastructure)?;
        if updated.rows_affected() == 0 {
            return Err(DomainError::MovieNotFound(movie.id));
        }
        if let Some(genre_ids) = genre_ids {
            replace_genres(&mut tx, movie.id, genre_ids)
                .await
                .map_err(infrastructure)?;
        }

        tx.commit().await.map_err(infrastructure)?;
        self.fetch(movie.id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}

#[async_trait]
impl MovieLookup for PgMovieRepository {
    async fn movie_exists(&self, movie_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
            .bind(movie_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)
    }
}

#[async_trait]
impl MovieAggregateUpdater for PgMovieRepository {
    async fn recompute_average_rating(&self, movie_id: Uuid) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE movies SET average_rating = \
             (SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION FROM reviews WHERE movie_id = $1) \
             WHERE id = $1",
        )
        .bind(movie_id)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }
}
