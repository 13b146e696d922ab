//! In-memory movie catalog and genre repository.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use cinereview_catalog::domain::genre::Genre;
use cinereview_catalog::domain::movie::{Movie, MovieFilters, NewMovie};
use cinereview_catalog::ports::{GenreRepository, MovieRepository};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use cinereview_reviews::ports::{MovieAggregateUpdater, MovieLookup};
use uuid::Uuid;

use crate::reviews::InMemoryReviewStore;

/// Movies held in memory. Serves as the review core's `MovieLookup` and
/// `MovieAggregateUpdater`; when a review store is attached the recompute
/// averages that store's ratings.
#[derive(Debug, Default)]
pub struct InMemoryMovieCatalog {
    movies: Mutex<Vec<Movie>>,
    genres: Mutex<Vec<Genre>>,
    reviews: Option<Arc<InMemoryReviewStore>>,
    recompute_calls: Mutex<Vec<Uuid>>,
}

impl InMemoryMovieCatalog {
    /// Creates an empty catalog with no review store attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty catalog whose recompute reads `reviews`.
    #[must_use]
    pub fn with_reviews(reviews: Arc<InMemoryReviewStore>) -> Self {
        Self {
            reviews: Some(reviews),
            ..Self::default()
        }
    }

    /// Makes `genres` resolvable when movies reference them by id.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_genres(&self, genres: &[Genre]) {
        self.genres.lock().unwrap().extend_from_slice(genres);
    }

    /// Inserts a movie with the given title and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_movie(&self, title: &str) -> Movie {
        let now = Utc::now();
        let movie = Movie {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: String::new(),
            release_year: 2000,
            director: String::new(),
            duration_minutes: 100,
            average_rating: 0.0,
            genres: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.movies.lock().unwrap().push(movie.clone());
        movie
    }

    /// The stored average rating of a movie.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn average_rating(&self, movie_id: Uuid) -> Option<f64> {
        self.movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == movie_id)
            .map(|m| m.average_rating)
    }

    /// Movie ids passed to `recompute_average_rating`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recompute_calls(&self) -> Vec<Uuid> {
        self.recompute_calls.lock().unwrap().clone()
    }

    fn resolve_genres(&self, genre_ids: &[Uuid]) -> Vec<Genre> {
        let genres = self.genres.lock().unwrap();
        genre_ids
            .iter()
            .filter_map(|id| genres.iter().find(|g| g.id == *id).cloned())
            .collect()
    }
}

#[async_trait]
impl MovieLookup for InMemoryMovieCatalog {
    async fn movie_exists(&self, movie_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.movies.lock().unwrap().iter().any(|m| m.id == movie_id))
    }
}

#[async_trait]
impl MovieAggregateUpdater for InMemoryMovieCatalog {
    async fn recompute_average_rating(&self, movie_id: Uuid) -> Result<(), DomainError> {
        self.recompute_calls.lock().unwrap().push(movie_id);

        let ratings = self
            .reviews
            .as_ref()
            .map(|store| store.ratings_for_movie(movie_id))
            .unwrap_or_default();
        let (sum, count) = ratings
            .iter()
            .fold((0.0, 0.0), |(sum, count), r| (sum + f64::from(*r), count + 1.0));
        let average = if count > 0.0 { sum / count } else { 0.0 };

        if let Some(movie) = self
            .movies
            .lock()
            .unwrap()
            .iter_mut()
            .find(|m| m.id == movie_id)
        {
            movie.average_rating = average;
        }
        Ok(())
    }
}

#[async_trait]
impl MovieRepository for InMemoryMovieCatalog {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Movie>, DomainError> {
        Ok(self
            .movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list(
        &self,
        filters: &MovieFilters,
        page: PageRequest,
    ) -> Result<(Vec<Movie>, i64), DomainError> {
        let mut matching: Vec<Movie> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .filter(|m| filters.matches(m))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(0);
        Ok((matching.into_iter().skip(skip).take(take).collect(), total))
    }

    async fn create(&self, movie: &NewMovie, genre_ids: &[Uuid]) -> Result<Movie, DomainError> {
        let now = Utc::now();
        let stored = Movie {
            id: Uuid::new_v4(),
            title: movie.title.clone(),
            description: movie.description.clone(),
            release_year: movie.release_year,
            director: movie.director.clone(),
            duration_minutes: movie.duration_minutes,
            average_rating: 0.0,
            genres: self.resolve_genres(genre_ids),
            created_at: now,
            updated_at: now,
        };
        self.movies.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        movie: &Movie,
        genre_ids: Option<&[Uuid]>,
    ) -> Result<Movie, DomainError> {
        let genres = genre_ids.map(|ids| self.resolve_genres(ids));
        let mut movies = self.movies.lock().unwrap();
        let stored = movies
            .iter_mut()
            .find(|m| m.id == movie.id)
            .ok_or(DomainError::MovieNotFound(movie.id))?;

        stored.title.clone_from(&movie.title);
        stored.description.clone_from(&movie.description);
        stored.release_year = movie.release_year;
        stored.director.clone_from(&movie.director);
        stored.duration_minutes = movie.duration_minutes;
        if let Some(genres) = genres {
            stored.genres = genres;
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.movies.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }
}

/// Genres held in memory with a unique-name check.
#[derive(Debug, Default)]
pub struct InMemoryGenreRepository {
    genres: Mutex<Vec<Genre>>,
}

impl InMemoryGenreRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every stored genre.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn genres(&self) -> Vec<Genre> {
        self.genres.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenreRepository for InMemoryGenreRepository {
    async fn list(&self) -> Result<Vec<Genre>, DomainError> {
        let mut genres = self.genres();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>, DomainError> {
        Ok(self
            .genres
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == id)
            .cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>, DomainError> {
        Ok(self
            .genres
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.name == name)
            .cloned())
    }

    async fn create(&self, name: &str) -> Result<Genre, DomainError> {
        let mut genres = self.genres.lock().unwrap();
        if genres.iter().any(|g| g.name == name) {
            return Err(DomainError::GenreAlreadyExists(name.to_owned()));
        }
        let genre = Genre {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        genres.push(genre.clone());
        Ok(genre)
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<Genre, DomainError> {
        let mut genres = self.genres.lock().unwrap();
        let genre = genres
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(DomainError::GenreNotFound(id))?;
        name.clone_into(&mut genre.name);
        Ok(genre.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.genres.lock().unwrap().retain(|g| g.id != id);
        Ok(())
    }
}
