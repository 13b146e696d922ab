//! PostgreSQL persistence for the CineReview API.
//!
//! One repository per aggregate, each implementing the capability traits
//! of its context crate with runtime-checked `sqlx` queries.

mod error;
pub mod pg_audit_repository;
pub mod pg_genre_repository;
pub mod pg_movie_repository;
pub mod pg_review_repository;
pub mod pg_stats_repository;
pub mod pg_user_repository;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

/// The workspace schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens a connection pool.
///
/// # Errors
///
/// Returns the driver error if the database is unreachable.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
