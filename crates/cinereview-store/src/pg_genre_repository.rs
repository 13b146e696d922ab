//! `PostgreSQL` implementation of the `GenreRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_catalog::domain::genre::Genre;
use cinereview_catalog::ports::GenreRepository;
use cinereview_core::error::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{infrastructure, map_conflict};

#[derive(sqlx::FromRow)]
pub(crate) struct GenreRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-backed genre repository.
#[derive(Debug, Clone)]
pub struct PgGenreRepository {
    pool: PgPool,
}

impl PgGenreRepository {
    /// Creates a new `PgGenreRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreRepository for PgGenreRepository {
    async fn list(&self) -> Result<Vec<Genre>, DomainError> {
        let rows: Vec<GenreRow> =
            sqlx::query_as("SELECT id, name, created_at FROM genres ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(infrastructure)?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>, DomainError> {
        let row: Option<GenreRow> =
            sqlx::query_as("SELECT id, name, created_at FROM genres WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        Ok(row.map(Genre::from))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>, DomainError> {
        let row: Option<GenreRow> =
            sqlx::query_as("SELECT id, name, created_at FROM genres WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(infrastructure)?;
        Ok(row.map(Genre::from))
    }

    async fn create(&self, name: &str) -> Result<Genre, DomainError> {
        let row: GenreRow = sqlx::query_as(
            "INSERT INTO genres (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_conflict(e, || DomainError::GenreAlreadyExists(name.to_owned())))?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<Genre, DomainError> {
        let row: Option<GenreRow> = sqlx::query_as(
            "UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_conflict(e, || DomainError::GenreAlreadyExists(name.to_owned())))?;
        row.map(Genre::from).ok_or(DomainError::GenreNotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}
