//! The review service: sole writer of review rows.
//!
//! Every successful mutation has passed the existence, uniqueness and
//! ownership checks, has triggered a recompute of the movie's average
//! rating, and has handed an event to the consumer. The last two are
//! best-effort: their failures are logged and never fail the mutation,
//! because the review write has already committed.

use std::sync::Arc;

use cinereview_core::clock::SharedClock;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::{DEFAULT_LIMIT, PageRequest};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::event_channel::ReviewEventSender;
use crate::domain::commands::{CreateReview, UpdateReview};
use crate::domain::events::{ReviewEvent, ReviewEventKind};
use crate::domain::review::{NewReview, Review, ReviewFilters};
use crate::ports::{MovieAggregateUpdater, MovieLookup, ReviewStore};

/// Enforces the review lifecycle rules.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
    movies: Arc<dyn MovieLookup>,
    aggregates: Arc<dyn MovieAggregateUpdater>,
    events: Option<ReviewEventSender>,
    clock: SharedClock,
}

impl ReviewService {
    /// Creates a service with no event channel wired; emission is a no-op
    /// until [`ReviewService::with_events`] is called.
    #[must_use]
    pub fn new(
        reviews: Arc<dyn ReviewStore>,
        movies: Arc<dyn MovieLookup>,
        aggregates: Arc<dyn MovieAggregateUpdater>,
        clock: SharedClock,
    ) -> Self {
        Self {
            reviews,
            movies,
            aggregates,
            events: None,
            clock,
        }
    }

    /// Wires the producer half of the review event channel.
    #[must_use]
    pub fn with_events(mut self, events: ReviewEventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Creates `author_id`'s review of `movie_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for invalid input,
    /// `DomainError::MovieNotFound` if the movie does not exist,
    /// `DomainError::ReviewAlreadyExists` if the author already reviewed it,
    /// and `DomainError::Infrastructure` if the store fails.
    #[instrument(skip(self, command), fields(movie_id = %movie_id, user_id = %author_id))]
    pub async fn create(
        &self,
        movie_id: Uuid,
        author_id: Uuid,
        command: &CreateReview,
    ) -> Result<Review, DomainError> {
        command.validate()?;

        if !self.movies.movie_exists(movie_id).await? {
            return Err(DomainError::MovieNotFound(movie_id));
        }

        if self
            .reviews
            .get_by_movie_and_author(movie_id, author_id)
            .await?
            .is_some()
        {
            return Err(DomainError::ReviewAlreadyExists {
                movie_id,
                user_id: author_id,
            });
        }

        let review = self
            .reviews
            .create(&NewReview {
                movie_id,
                user_id: author_id,
                rating: command.rating,
                title: command.title.clone(),
                content: command.content.clone(),
            })
            .await?;

        info!(review_id = %review.id, rating = review.rating, "review created");

        self.after_mutation(ReviewEventKind::Created, &review).await;
        Ok(review)
    }

    /// Applies the non-empty fields of `command` to the review. Only the
    /// author may update; administrators may not.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReviewNotFound` if the review does not exist,
    /// `DomainError::Forbidden` if the requester is not the author,
    /// `DomainError::Validation` for invalid input,
    /// and `DomainError::Infrastructure` if the store fails.
    #[instrument(skip(self, command), fields(review_id = %review_id, requester_id = %requester_id))]
    pub async fn update(
        &self,
        review_id: Uuid,
        requester_id: Uuid,
        command: &UpdateReview,
    ) -> Result<Review, DomainError> {
        let mut review = self
            .reviews
            .get_by_id(review_id)
            .await?
            .ok_or(DomainError::ReviewNotFound(review_id))?;

        if !review.is_authored_by(requester_id) {
            return Err(DomainError::Forbidden(
                "only the author may update a review".into(),
            ));
        }

        command.validate()?;
        command.apply_to(&mut review);
        let review = self.reviews.update(&review).await?;

        info!(rating = review.rating, "review updated");

        self.after_mutation(ReviewEventKind::Updated, &review).await;
        Ok(review)
    }

    /// Deletes the review. Allowed for its author and for administrators.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReviewNotFound` if the review does not exist,
    /// `DomainError::Forbidden` if the requester is neither author nor
    /// administrator, and `DomainError::Infrastructure` if the store fails.
    #[instrument(skip(self), fields(review_id = %review_id, requester_id = %requester_id))]
    pub async fn delete(
        &self,
        review_id: Uuid,
        requester_id: Uuid,
        is_admin: bool,
    ) -> Result<(), DomainError> {
        let review = self
            .reviews
            .get_by_id(review_id)
            .await?
            .ok_or(DomainError::ReviewNotFound(review_id))?;

        if !is_admin && !review.is_authored_by(requester_id) {
            return Err(DomainError::Forbidden(
                "only the author or an administrator may delete a review".into(),
            ));
        }

        self.reviews.delete(review_id).await?;

        info!(movie_id = %review.movie_id, by_admin = is_admin, "review deleted");

        self.after_mutation(ReviewEventKind::Deleted, &review).await;
        Ok(())
    }

    /// One page of a movie's reviews.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn list_by_movie(
        &self,
        movie_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        self.reviews
            .list_by_movie(movie_id, filters, page.normalized(DEFAULT_LIMIT))
            .await
    }

    /// One page of a user's reviews.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        self.reviews
            .list_by_author(user_id, filters, page.normalized(DEFAULT_LIMIT))
            .await
    }

    /// Number of reviews the user has written.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn count_by_user(&self, user_id: Uuid) -> Result<i64, DomainError> {
        self.reviews.count_by_author(user_id).await
    }

    async fn after_mutation(&self, kind: ReviewEventKind, review: &Review) {
        if let Err(e) = self
            .aggregates
            .recompute_average_rating(review.movie_id)
            .await
        {
            warn!(
                movie_id = %review.movie_id,
                review_id = %review.id,
                error = %e,
                "average rating recompute failed after review mutation"
            );
        }

        if let Some(events) = &self.events {
            events.emit(ReviewEvent::for_review(kind, review, self.clock.now()));
        }
    }
}
