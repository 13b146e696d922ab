//! Mapping from driver errors to domain errors.

use cinereview_core::error::DomainError;

/// Wraps a driver error as an infrastructure failure.
pub(crate) fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(e.to_string())
}

/// Returns `true` if `e` is a unique-constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Maps a unique violation to `on_conflict`, anything else to
/// infrastructure.
pub(crate) fn map_conflict(e: sqlx::Error, on_conflict: impl FnOnce() -> DomainError) -> DomainError {
    if is_unique_violation(&e) {
        on_conflict()
    } else {
        infrastructure(e)
    }
}
