//! Genres classify movies; a movie belongs to one or more.

use chrono::{DateTime, Utc};
use cinereview_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum genre name length, in characters.
pub const MAX_GENRE_NAME_LEN: usize = 100;

/// A named movie category. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Identifier assigned by the store.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Checks that a genre name is present and short enough.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the name is blank or too long.
pub fn validate_genre_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::Validation(
            "genre name must not be empty".into(),
        ));
    }
    if name.chars().count() > MAX_GENRE_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "genre name must be at most {MAX_GENRE_NAME_LEN} characters"
        )));
    }
    Ok(())
}
