//! Commands accepted by the catalog services.

use cinereview_core::error::DomainError;
use serde::Deserialize;
use uuid::Uuid;

use super::movie::{MAX_RELEASE_YEAR, MAX_TITLE_LEN, MIN_RELEASE_YEAR, Movie, NewMovie};

/// Command to create or rename a genre.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveGenre {
    /// Genre name.
    pub name: String,
}

/// Command to add a movie to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateMovie {
    /// Title.
    pub title: String,
    /// Synopsis.
    #[serde(default)]
    pub description: String,
    /// Year of release.
    pub release_year: i32,
    /// Director.
    #[serde(default)]
    pub director: String,
    /// Running time in minutes.
    pub duration_minutes: i32,
    /// Genres to attach; at least one.
    #[serde(default)]
    pub genre_ids: Vec<Uuid>,
}

impl CreateMovie {
    /// Checks field ranges and that at least one genre is given. Genre
    /// existence is checked by the service.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        validate_title(&self.title)?;
        validate_release_year(self.release_year)?;
        validate_director(&self.director)?;
        validate_duration(self.duration_minutes)?;
        if self.genre_ids.is_empty() {
            return Err(at_least_one_genre());
        }
        Ok(())
    }

    /// The insert form of this command.
    #[must_use]
    pub fn to_new_movie(&self) -> NewMovie {
        NewMovie {
            title: self.title.clone(),
            description: self.description.clone(),
            release_year: self.release_year,
            director: self.director.clone(),
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Command to change a movie. Absent, zero or empty fields leave the stored
/// value unchanged; `genre_ids: None` keeps the current genres.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateMovie {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New synopsis.
    #[serde(default)]
    pub description: Option<String>,
    /// New release year.
    #[serde(default)]
    pub release_year: Option<i32>,
    /// New director.
    #[serde(default)]
    pub director: Option<String>,
    /// New running time.
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    /// Replacement genre set.
    #[serde(default)]
    pub genre_ids: Option<Vec<Uuid>>,
}

impl UpdateMovie {
    /// Validates only the fields that will overwrite stored values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(title) = non_empty(self.title.as_deref()) {
            validate_title(title)?;
        }
        if let Some(year) = non_zero(self.release_year) {
            validate_release_year(year)?;
        }
        if let Some(director) = non_empty(self.director.as_deref()) {
            validate_director(director)?;
        }
        if let Some(duration) = non_zero(self.duration_minutes) {
            validate_duration(duration)?;
        }
        if self.genre_ids.as_ref().is_some_and(Vec::is_empty) {
            return Err(at_least_one_genre());
        }
        Ok(())
    }

    /// Overwrites the non-empty scalar fields of `movie`. Genres are
    /// replaced separately by the repository.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = non_empty(self.title.as_deref()) {
            title.clone_into(&mut movie.title);
        }
        if let Some(description) = non_empty(self.description.as_deref()) {
            description.clone_into(&mut movie.description);
        }
        if let Some(year) = non_zero(self.release_year) {
            movie.release_year = year;
        }
        if let Some(director) = non_empty(self.director.as_deref()) {
            director.clone_into(&mut movie.director);
        }
        if let Some(duration) = non_zero(self.duration_minutes) {
            movie.duration_minutes = duration;
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn non_zero(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v != 0)
}

fn at_least_one_genre() -> DomainError {
    DomainError::Validation("at least one genre required".into())
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_director(director: &str) -> Result<(), DomainError> {
    if director.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "director must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_release_year(year: i32) -> Result<(), DomainError> {
    if (MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "release year must be between {MIN_RELEASE_YEAR} and {MAX_RELEASE_YEAR}"
        )))
    }
}

fn validate_duration(minutes: i32) -> Result<(), DomainError> {
    if minutes < 1 {
        return Err(DomainError::Validation(
            "duration must be at least 1 minute".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn valid_create() -> CreateMovie {
        CreateMovie {
            title: "Alien".to_owned(),
            description: String::new(),
            release_year: 1979,
            director: "Ridley Scott".to_owned(),
            duration_minutes: 117,
            genre_ids: vec![Uuid::new_v4()],
        }
    }

    fn stored_movie() -> Movie {
        let now = Utc::now();
        Movie {
            id: Uuid::new_v4(),
            title: "Alien".to_owned(),
            description: "In space no one can hear you scream.".to_owned(),
            release_year: 1979,
            director: "Ridley Scott".to_owned(),
            duration_minutes: 117,
            average_rating: 0.0,
            genres: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_create_passes() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_create_rejects_year_out_of_range() {
        let command = CreateMovie {
            release_year: 1799,
            ..valid_create()
        };

        match command.validate().unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("release year")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_create_requires_a_genre() {
        let command = CreateMovie {
            genre_ids: Vec::new(),
            ..valid_create()
        };

        match command.validate().unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "at least one genre required"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_zero_duration() {
        let command = CreateMovie {
            duration_minutes: 0,
            ..valid_create()
        };

        assert!(command.validate().is_err());
    }

    #[test]
    fn test_update_with_empty_genre_list_is_rejected() {
        let command = UpdateMovie {
            genre_ids: Some(Vec::new()),
            ..UpdateMovie::default()
        };

        assert!(command.validate().is_err());
    }

    #[test]
    fn test_update_ignores_zero_and_empty_fields() {
        // Arrange
        let mut movie = stored_movie();
        let before = movie.clone();
        let command = UpdateMovie {
            title: Some(String::new()),
            release_year: Some(0),
            duration_minutes: Some(0),
            ..UpdateMovie::default()
        };

        // Act
        command.validate().unwrap();
        command.apply_to(&mut movie);

        // Assert
        assert_eq!(movie, before);
    }

    #[test]
    fn test_update_overwrites_supplied_fields() {
        let mut movie = stored_movie();
        let command = UpdateMovie {
            title: Some("Aliens".to_owned()),
            release_year: Some(1986),
            ..UpdateMovie::default()
        };

        command.apply_to(&mut movie);

        assert_eq!(movie.title, "Aliens");
        assert_eq!(movie.release_year, 1986);
        assert_eq!(movie.director, "Ridley Scott");
    }
}
