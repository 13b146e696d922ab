//! Domain events emitted after review mutations.
//!
//! Events are in-memory messages only. They are never persisted and are
//! lost if the channel is full or the process stops.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::review::Review;

/// Event type string for a created review.
pub const REVIEW_CREATED_EVENT_TYPE: &str = "review_created";
/// Event type string for an updated review.
pub const REVIEW_UPDATED_EVENT_TYPE: &str = "review_updated";
/// Event type string for a deleted review.
pub const REVIEW_DELETED_EVENT_TYPE: &str = "review_deleted";

/// What happened to the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewEventKind {
    /// A review was created.
    Created,
    /// A review was updated.
    Updated,
    /// A review was deleted.
    Deleted,
}

impl ReviewEventKind {
    /// Returns the event type name recorded in the audit log.
    #[must_use]
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Created => REVIEW_CREATED_EVENT_TYPE,
            Self::Updated => REVIEW_UPDATED_EVENT_TYPE,
            Self::Deleted => REVIEW_DELETED_EVENT_TYPE,
        }
    }
}

/// One review mutation. A nil id means the reference is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEvent {
    /// What happened.
    pub kind: ReviewEventKind,
    /// The reviewed movie.
    pub movie_id: Uuid,
    /// The review's author.
    pub user_id: Uuid,
    /// The mutated review.
    pub review_id: Uuid,
    /// Wall-clock time of the mutation.
    pub occurred_at: DateTime<Utc>,
}

impl ReviewEvent {
    /// Builds the event describing `kind` applied to `review`.
    #[must_use]
    pub fn for_review(kind: ReviewEventKind, review: &Review, occurred_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            movie_id: review.movie_id,
            user_id: review.user_id,
            review_id: review.id,
            occurred_at,
        }
    }
}
