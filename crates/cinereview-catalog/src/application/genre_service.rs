//! Genre management.

use std::sync::Arc;

use cinereview_core::error::DomainError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::commands::SaveGenre;
use crate::domain::genre::{Genre, validate_genre_name};
use crate::ports::GenreRepository;

/// Lists, creates, renames and deletes genres.
#[derive(Clone)]
pub struct GenreService {
    genres: Arc<dyn GenreRepository>,
}

impl GenreService {
    /// Creates a new `GenreService`.
    #[must_use]
    pub fn new(genres: Arc<dyn GenreRepository>) -> Self {
        Self { genres }
    }

    /// All genres.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn list(&self) -> Result<Vec<Genre>, DomainError> {
        self.genres.list().await
    }

    /// One genre.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::GenreNotFound` if it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<Genre, DomainError> {
        self.genres
            .get_by_id(id)
            .await?
            .ok_or(DomainError::GenreNotFound(id))
    }

    /// Creates a genre with a unique name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad name and
    /// `DomainError::GenreAlreadyExists` if the name is taken.
    #[instrument(skip(self, command), fields(name = %command.name))]
    pub async fn create(&self, command: &SaveGenre) -> Result<Genre, DomainError> {
        validate_genre_name(&command.name)?;

        if self.genres.get_by_name(&command.name).await?.is_some() {
            return Err(DomainError::GenreAlreadyExists(command.name.clone()));
        }

        let genre = self.genres.create(&command.name).await?;
        info!(genre_id = %genre.id, "genre created");
        Ok(genre)
    }

    /// Renames a genre.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad name,
    /// `DomainError::GenreNotFound` if the genre does not exist and
    /// `DomainError::GenreAlreadyExists` if another genre has the name.
    #[instrument(skip(self, command), fields(genre_id = %id, name = %command.name))]
    pub async fn update(&self, id: Uuid, command: &SaveGenre) -> Result<Genre, DomainError> {
        validate_genre_name(&command.name)?;
        self.get(id).await?;

        let taken = self
            .genres
            .get_by_name(&command.name)
            .await?
            .is_some_and(|existing| existing.id != id);
        if taken {
            return Err(DomainError::GenreAlreadyExists(command.name.clone()));
        }

        let genre = self.genres.update(id, &command.name).await?;
        info!("genre updated");
        Ok(genre)
    }

    /// Deletes a genre.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::GenreNotFound` if it does not exist.
    #[instrument(skip(self), fields(genre_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.get(id).await?;
        self.genres.delete(id).await?;
        info!("genre deleted");
        Ok(())
    }
}
