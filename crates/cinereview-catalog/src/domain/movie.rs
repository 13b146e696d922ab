//! The movie entity, its insert form and list filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::genre::Genre;

/// Maximum title and director length, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Earliest accepted release year.
pub const MIN_RELEASE_YEAR: i32 = 1800;

/// Latest accepted release year.
pub const MAX_RELEASE_YEAR: i32 = 2030;

/// A movie in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Identifier assigned by the store.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Synopsis; may be empty.
    pub description: String,
    /// Year of release.
    pub release_year: i32,
    /// Director; may be empty.
    pub director: String,
    /// Running time in minutes.
    pub duration_minutes: i32,
    /// Mean rating over the movie's current reviews, `0.0` with none.
    /// Derived; only the aggregate recompute writes it.
    pub average_rating: f64,
    /// Genres the movie belongs to.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A movie about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    /// Title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Year of release.
    pub release_year: i32,
    /// Director.
    pub director: String,
    /// Running time in minutes.
    pub duration_minutes: i32,
}

/// Optional constraints on movie listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilters {
    /// Case-insensitive substring of a genre name.
    pub genre: Option<String>,
    /// Exact genre.
    pub genre_id: Option<Uuid>,
    /// Exact release year.
    pub year: Option<i32>,
    /// Minimum average rating.
    pub min_rating: Option<f64>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

impl MovieFilters {
    /// Returns `true` if `movie` satisfies every filter that is set.
    #[must_use]
    pub fn matches(&self, movie: &Movie) -> bool {
        let genre_name = self.genre.as_deref().map(str::to_lowercase);
        let search = self.search.as_deref().map(str::to_lowercase);

        self.genre_id
            .is_none_or(|id| movie.genres.iter().any(|g| g.id == id))
            && genre_name.is_none_or(|needle| {
                movie
                    .genres
                    .iter()
                    .any(|g| g.name.to_lowercase().contains(&needle))
            })
            && self.year.is_none_or(|year| movie.release_year == year)
            && self
                .min_rating
                .is_none_or(|min| movie.average_rating >= min)
            && search.is_none_or(|needle| {
                movie.title.to_lowercase().contains(&needle)
                    || movie.description.to_lowercase().contains(&needle)
            })
    }
}
