//! Read-only aggregates shown on profiles and the admin dashboard.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The genre a user reviews most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteGenre {
    /// Genre id.
    pub id: Uuid,
    /// Genre name.
    pub name: String,
}

/// Per-user review statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Mean rating the user gives, `0.0` with no reviews.
    pub average_rating: f64,
    /// Most-reviewed genre, if the user has reviewed anything.
    pub favorite_genre: Option<FavoriteGenre>,
}

/// Site-wide totals for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    /// Registered users.
    pub total_users: i64,
    /// Movies in the catalog.
    pub total_movies: i64,
    /// Reviews written.
    pub total_reviews: i64,
    /// Genres defined.
    pub total_genres: i64,
    /// Mean of all movies' average ratings.
    pub average_rating: f64,
    /// Users registered in the last seven days.
    pub users_last_7_days: i64,
    /// Reviews written in the last seven days.
    pub reviews_last_7_days: i64,
    /// Movies added in the last seven days.
    pub movies_last_7_days: i64,
}
