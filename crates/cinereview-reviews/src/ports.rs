//! Capabilities the reviews context needs from the outside world.
//!
//! Only the methods the review service and event consumer actually call
//! appear here; storage technology is the implementor's concern.

use async_trait::async_trait;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use uuid::Uuid;

use crate::domain::review::{NewReview, Review, ReviewFilters};

/// Persistence for reviews. The review service is its only writer.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Point lookup by review id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Review>, DomainError>;

    /// Lookup used by the one-review-per-movie-per-author check.
    async fn get_by_movie_and_author(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Review>, DomainError>;

    /// Inserts a review; the store assigns id and timestamps.
    ///
    /// Implementations backed by a uniqueness constraint return
    /// `DomainError::ReviewAlreadyExists` when it fires.
    async fn create(&self, review: &NewReview) -> Result<Review, DomainError>;

    /// Persists rating, title and content of `review`, refreshing
    /// `updated_at`.
    async fn update(&self, review: &Review) -> Result<Review, DomainError>;

    /// Removes the review.
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// One page of a movie's reviews.
    async fn list_by_movie(
        &self,
        movie_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError>;

    /// One page of an author's reviews.
    async fn list_by_author(
        &self,
        user_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError>;

    /// Number of reviews written by the author.
    async fn count_by_author(&self, user_id: Uuid) -> Result<i64, DomainError>;
}

/// Existence check for the movie a review targets.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    /// Returns `true` if the movie exists.
    async fn movie_exists(&self, movie_id: Uuid) -> Result<bool, DomainError>;
}

/// Recomputes a movie's derived average rating from its current reviews.
///
/// Recomputation must be idempotent: calling it twice with no review change
/// in between yields the same value.
#[async_trait]
pub trait MovieAggregateUpdater: Send + Sync {
    /// Recompute and persist the movie's `average_rating`.
    async fn recompute_average_rating(&self, movie_id: Uuid) -> Result<(), DomainError>;
}
