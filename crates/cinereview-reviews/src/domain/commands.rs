//! Commands accepted by the review service.

use cinereview_core::error::DomainError;
use serde::Deserialize;

use super::review::{MAX_RATING, MAX_TITLE_LEN, MIN_RATING, Review};

/// Command to review a movie.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateReview {
    /// Rating between 1 and 10.
    pub rating: i32,
    /// Review headline.
    pub title: String,
    /// Review body.
    pub content: String,
}

impl CreateReview {
    /// Checks rating range and that title and body are present.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_rating(self.rating)?;
        validate_title(&self.title)?;
        if self.content.trim().is_empty() {
            return Err(DomainError::Validation(
                "review content must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Command to change an existing review.
///
/// A field that is absent, zero or empty leaves the stored value unchanged,
/// so a rating or text cannot be cleared through this command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateReview {
    /// New rating.
    #[serde(default)]
    pub rating: Option<i32>,
    /// New headline.
    #[serde(default)]
    pub title: Option<String>,
    /// New body.
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateReview {
    fn rating_change(&self) -> Option<i32> {
        self.rating.filter(|rating| *rating != 0)
    }

    fn title_change(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }

    fn content_change(&self) -> Option<&str> {
        self.content.as_deref().filter(|content| !content.is_empty())
    }

    /// Validates only the fields that will overwrite stored values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(rating) = self.rating_change() {
            validate_rating(rating)?;
        }
        if let Some(title) = self.title_change() {
            validate_title(title)?;
        }
        Ok(())
    }

    /// Overwrites the non-empty fields of `review`.
    pub fn apply_to(&self, review: &mut Review) {
        if let Some(rating) = self.rating_change() {
            review.rating = rating;
        }
        if let Some(title) = self.title_change() {
            title.clone_into(&mut review.title);
        }
        if let Some(content) = self.content_change() {
            content.clone_into(&mut review.content);
        }
    }
}

fn validate_rating(rating: i32) -> Result<(), DomainError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation(
            "review title must not be empty".into(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "review title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}
