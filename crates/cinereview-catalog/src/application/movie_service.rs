//! Movie management and catalog queries.

use std::sync::Arc;

use cinereview_core::error::DomainError;
use cinereview_core::pagination::{DEFAULT_LIMIT, PageRequest, Paginated};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::commands::{CreateMovie, UpdateMovie};
use crate::domain::movie::{Movie, MovieFilters};
use crate::ports::{GenreRepository, MovieRepository};

/// Lists, creates, updates and deletes movies.
#[derive(Clone)]
pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
    genres: Arc<dyn GenreRepository>,
}

impl MovieService {
    /// Creates a new `MovieService`.
    #[must_use]
    pub fn new(movies: Arc<dyn MovieRepository>, genres: Arc<dyn GenreRepository>) -> Self {
        Self { movies, genres }
    }

    /// One page of movies matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn list(
        &self,
        filters: &MovieFilters,
        page: PageRequest,
    ) -> Result<Paginated<Movie>, DomainError> {
        let page = page.normalized(DEFAULT_LIMIT);
        let (movies, total) = self.movies.list(filters, page).await?;
        Ok(Paginated::new(movies, total, page))
    }

    /// One movie with its genres.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MovieNotFound` if it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<Movie, DomainError> {
        self.movies
            .get_by_id(id)
            .await?
            .ok_or(DomainError::MovieNotFound(id))
    }

    /// Adds a movie.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for invalid input and
    /// `DomainError::GenreNotFound` for an unknown genre id.
    #[instrument(skip(self, command), fields(title = %command.title))]
    pub async fn create(&self, command: &CreateMovie) -> Result<Movie, DomainError> {
        command.validate()?;
        self.ensure_genres_exist(&command.genre_ids).await?;

        let movie = self
            .movies
            .create(&command.to_new_movie(), &command.genre_ids)
            .await?;
        info!(movie_id = %movie.id, "movie created");
        Ok(movie)
    }

    /// Applies the non-empty fields of `command`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for invalid input,
    /// `DomainError::MovieNotFound` if the movie does not exist and
    /// `DomainError::GenreNotFound` for an unknown genre id.
    #[instrument(skip(self, command), fields(movie_id = %id))]
    pub async fn update(&self, id: Uuid, command: &UpdateMovie) -> Result<Movie, DomainError> {
        command.validate()?;
        let mut movie = self.get(id).await?;

        if let Some(genre_ids) = &command.genre_ids {
            self.ensure_genres_exist(genre_ids).await?;
        }

        command.apply_to(&mut movie);
        let movie = self
            .movies
            .update(&movie, command.genre_ids.as_deref())
            .await?;
        info!("movie updated");
        Ok(movie)
    }

    /// Removes a movie and its reviews.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MovieNotFound` if it does not exist.
    #[instrument(skip(self), fields(movie_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.get(id).await?;
        self.movies.delete(id).await?;
        info!("movie deleted");
        Ok(())
    }

    async fn ensure_genres_exist(&self, genre_ids: &[Uuid]) -> Result<(), DomainError> {
        for &genre_id in genre_ids {
            if self.genres.get_by_id(genre_id).await?.is_none() {
                return Err(DomainError::GenreNotFound(genre_id));
            }
        }
        Ok(())
    }
}
