//! Persistence capabilities of the Catalog context.

use async_trait::async_trait;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use uuid::Uuid;

use crate::domain::genre::Genre;
use crate::domain::movie::{Movie, MovieFilters, NewMovie};

/// Persistence for genres.
#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// All genres ordered by name.
    async fn list(&self) -> Result<Vec<Genre>, DomainError>;

    /// Point lookup by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>, DomainError>;

    /// Lookup by exact name.
    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>, DomainError>;

    /// Inserts a genre. Returns `DomainError::GenreAlreadyExists` if the
    /// name is taken.
    async fn create(&self, name: &str) -> Result<Genre, DomainError>;

    /// Renames a genre. Returns `DomainError::GenreNotFound` if it does not
    /// exist.
    async fn update(&self, id: Uuid, name: &str) -> Result<Genre, DomainError>;

    /// Removes a genre and its movie associations.
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

/// Persistence for movies and their genre associations.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Point lookup with genres attached.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Movie>, DomainError>;

    /// One page of matching movies, newest first, with the total match
    /// count.
    async fn list(
        &self,
        filters: &MovieFilters,
        page: PageRequest,
    ) -> Result<(Vec<Movie>, i64), DomainError>;

    /// Inserts a movie with its genres; `average_rating` starts at zero.
    async fn create(&self, movie: &NewMovie, genre_ids: &[Uuid]) -> Result<Movie, DomainError>;

    /// Persists the scalar fields of `movie` and, when given, replaces its
    /// genre set. Never writes `average_rating`.
    async fn update(
        &self,
        movie: &Movie,
        genre_ids: Option<&[Uuid]>,
    ) -> Result<Movie, DomainError>;

    /// Removes a movie; its reviews and genre associations go with it.
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
