//! Shared test doubles for the CineReview API.

mod accounts;
mod audit;
mod catalog;
mod clock;
mod reviews;

pub use accounts::{InMemoryUserRepository, PlainTextPasswordHasher, StaticStatsReader};
pub use audit::{FailingAuditLogWriter, InMemoryAuditLog, RecordingAuditLogWriter};
pub use catalog::{InMemoryGenreRepository, InMemoryMovieCatalog};
pub use clock::FixedClock;
pub use reviews::{
    FailingAggregateUpdater, FailingReviewStore, InMemoryReviewStore, RecordingAggregateUpdater,
};
