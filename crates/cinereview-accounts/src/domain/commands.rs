//! Commands accepted by the account services.

use cinereview_core::error::DomainError;
use serde::Deserialize;

/// Shortest accepted username, in characters.
pub const MIN_USERNAME_LEN: usize = 3;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 100;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Command to open an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUser {
    /// Login email.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl RegisterUser {
    /// Checks email shape, username length and password length.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

/// Command to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl LoginUser {
    /// Both fields are required.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either is missing.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::Validation("password is required".into()));
        }
        Ok(())
    }
}

/// Command to change email and/or username. Absent or empty fields leave
/// the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateUser {
    /// New login email.
    #[serde(default)]
    pub email: Option<String>,
    /// New display name.
    #[serde(default)]
    pub username: Option<String>,
}

impl UpdateUser {
    /// The email change, if any.
    #[must_use]
    pub fn email_change(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// The username change, if any.
    #[must_use]
    pub fn username_change(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Validates the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(email) = self.email_change() {
            validate_email(email)?;
        }
        if let Some(username) = self.username_change() {
            validate_username(username)?;
        }
        Ok(())
    }
}

/// Command to change one's own password.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePassword {
    /// The password currently set.
    pub current_password: String,
    /// The replacement.
    pub new_password: String,
}

impl ChangePassword {
    /// Checks the new password's length.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if it is too short.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_password(&self.new_password)
    }
}

/// Checks that an email looks like one.
///
/// # Errors
///
/// Returns `DomainError::Validation` if it has no `@`.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(DomainError::Validation("invalid email".into()))
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )))
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
