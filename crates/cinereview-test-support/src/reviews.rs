//! Doubles for the review store and the movie aggregate updater.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use cinereview_reviews::domain::review::{NewReview, Review, ReviewFilters, ReviewSort};
use cinereview_reviews::ports::{MovieAggregateUpdater, ReviewStore};
use uuid::Uuid;

/// A review store backed by a vector. Enforces the one-review-per-movie-
/// per-author constraint the way the database does.
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    reviews: Mutex<Vec<Review>>,
}

impl InMemoryReviewStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every stored review.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn reviews(&self) -> Vec<Review> {
        self.reviews.lock().unwrap().clone()
    }

    /// Ratings of the movie's current reviews.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn ratings_for_movie(&self, movie_id: Uuid) -> Vec<i32> {
        self.reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.rating)
            .collect()
    }

    fn page_where(
        &self,
        keep: impl Fn(&Review) -> bool,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Vec<Review> {
        let mut matching: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| keep(r) && filters.matches(r))
            .cloned()
            .collect();

        match filters.sort {
            ReviewSort::RatingDesc => matching.sort_by(|a, b| b.rating.cmp(&a.rating)),
            ReviewSort::RatingAsc => matching.sort_by_key(|r| r.rating),
            ReviewSort::CreatedDesc => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ReviewSort::CreatedAsc => matching.sort_by_key(|r| r.created_at),
        }

        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(0);
        matching.into_iter().skip(skip).take(take).collect()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn get_by_movie_and_author(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Review>, DomainError> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.movie_id == movie_id && r.user_id == user_id)
            .cloned())
    }

    async fn create(&self, review: &NewReview) -> Result<Review, DomainError> {
        let mut reviews = self.reviews.lock().unwrap();
        if reviews
            .iter()
            .any(|r| r.movie_id == review.movie_id && r.user_id == review.user_id)
        {
            return Err(DomainError::ReviewAlreadyExists {
                movie_id: review.movie_id,
                user_id: review.user_id,
            });
        }

        let now = Utc::now();
        let stored = Review {
            id: Uuid::new_v4(),
            movie_id: review.movie_id,
            user_id: review.user_id,
            rating: review.rating,
            title: review.title.clone(),
            content: review.content.clone(),
            created_at: now,
            updated_at: now,
        };
        reviews.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, review: &Review) -> Result<Review, DomainError> {
        let mut reviews = self.reviews.lock().unwrap();
        let stored = reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or(DomainError::ReviewNotFound(review.id))?;
        stored.rating = review.rating;
        stored.title.clone_from(&review.title);
        stored.content.clone_from(&review.content);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.reviews.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn list_by_movie(
        &self,
        movie_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        Ok(self.page_where(|r| r.movie_id == movie_id, filters, page))
    }

    async fn list_by_author(
        &self,
        user_id: Uuid,
        filters: &ReviewFilters,
        page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        Ok(self.page_where(|r| r.user_id == user_id, filters, page))
    }

    async fn count_by_author(&self, user_id: Uuid) -> Result<i64, DomainError> {
        let count = self
            .reviews
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

/// A review store whose every call fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingReviewStore;

fn connection_refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl ReviewStore for FailingReviewStore {
    async fn get_by_id(&self, _id: Uuid) -> Result<Option<Review>, DomainError> {
        Err(connection_refused())
    }

    async fn get_by_movie_and_author(
        &self,
        _movie_id: Uuid,
        _user_id: Uuid,
    ) -> Result<Option<Review>, DomainError> {
        Err(connection_refused())
    }

    async fn create(&self, _review: &NewReview) -> Result<Review, DomainError> {
        Err(connection_refused())
    }

    async fn update(&self, _review: &Review) -> Result<Review, DomainError> {
        Err(connection_refused())
    }

    async fn delete(&self, _id: Uuid) -> Result<(), DomainError> {
        Err(connection_refused())
    }

    async fn list_by_movie(
        &self,
        _movie_id: Uuid,
        _filters: &ReviewFilters,
        _page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        Err(connection_refused())
    }

    async fn list_by_author(
        &self,
        _user_id: Uuid,
        _filters: &ReviewFilters,
        _page: PageRequest,
    ) -> Result<Vec<Review>, DomainError> {
        Err(connection_refused())
    }

    async fn count_by_author(&self, _user_id: Uuid) -> Result<i64, DomainError> {
        Err(connection_refused())
    }
}

/// An aggregate updater that records every movie it was asked to
/// recompute and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingAggregateUpdater {
    calls: Mutex<Vec<Uuid>>,
}

impl RecordingAggregateUpdater {
    /// Creates an updater with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Movie ids passed to `recompute_average_rating`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<Uuid> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieAggregateUpdater for RecordingAggregateUpdater {
    async fn recompute_average_rating(&self, movie_id: Uuid) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(movie_id);
        Ok(())
    }
}

/// An aggregate updater that records every call and then fails.
#[derive(Debug, Default)]
pub struct FailingAggregateUpdater {
    calls: Mutex<Vec<Uuid>>,
}

impl FailingAggregateUpdater {
    /// Creates an updater with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Movie ids passed to `recompute_average_rating`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<Uuid> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieAggregateUpdater for FailingAggregateUpdater {
    async fn recompute_average_rating(&self, movie_id: Uuid) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(movie_id);
        Err(DomainError::Infrastructure("recompute failed".into()))
    }
}
