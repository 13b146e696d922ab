//! The review entity and its list filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted rating.
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i32 = 10;

/// Maximum review title length, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// A rating and text authored by one user for one movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Identifier assigned by the store.
    pub id: Uuid,
    /// The reviewed movie.
    pub movie_id: Uuid,
    /// The author.
    pub user_id: Uuid,
    /// Rating between [`MIN_RATING`] and [`MAX_RATING`].
    pub rating: i32,
    /// Review headline.
    pub title: String,
    /// Review body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Returns `true` if `user_id` wrote this review.
    #[must_use]
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// A review about to be inserted; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// The reviewed movie.
    pub movie_id: Uuid,
    /// The author.
    pub user_id: Uuid,
    /// Rating.
    pub rating: i32,
    /// Review headline.
    pub title: String,
    /// Review body.
    pub content: String,
}

/// Ordering applied to review listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewSort {
    /// Highest rating first.
    RatingDesc,
    /// Lowest rating first.
    RatingAsc,
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
}

impl ReviewSort {
    /// Parses a `sort` query value. Unknown or missing values fall back to
    /// newest-first.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("rating_desc") => Self::RatingDesc,
            Some("rating_asc") => Self::RatingAsc,
            Some("created_asc") => Self::CreatedAsc,
            _ => Self::CreatedDesc,
        }
    }
}

/// Optional rating-range filter and ordering for review listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilters {
    /// Only reviews rated at least this much.
    pub min_rating: Option<i32>,
    /// Only reviews rated at most this much.
    pub max_rating: Option<i32>,
    /// Ordering.
    pub sort: ReviewSort,
}

impl ReviewFilters {
    /// Returns `true` if `review` falls inside the rating range.
    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        self.min_rating.is_none_or(|min| review.rating >= min)
            && self.max_rating.is_none_or(|max| review.rating <= max)
    }
}
