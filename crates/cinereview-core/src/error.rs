//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The referenced movie does not exist.
    #[error("movie not found: {0}")]
    MovieNotFound(Uuid),

    /// The referenced review does not exist.
    #[error("review not found: {0}")]
    ReviewNotFound(Uuid),

    /// The referenced genre does not exist.
    #[error("genre not found: {0}")]
    GenreNotFound(Uuid),

    /// The referenced user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    /// The author already reviewed this movie.
    #[error("review already exists for movie {movie_id} by user {user_id}")]
    ReviewAlreadyExists {
        /// The reviewed movie.
        movie_id: Uuid,
        /// The author of the existing review.
        user_id: Uuid,
    },

    /// A genre with this name already exists.
    #[error("genre already exists: {0}")]
    GenreAlreadyExists(String),

    /// A user with this email or username already exists.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// The requester is authenticated but not allowed to perform the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Login failed, or the supplied current password did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request carried no valid bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` for the not-found family of errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MovieNotFound(_)
                | Self::ReviewNotFound(_)
                | Self::GenreNotFound(_)
                | Self::UserNotFound(_)
        )
    }
}
