//! Audit log records and the capabilities that write and read them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::pagination::PageRequest;

/// An immutable record of something that happened in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Identifier assigned by the store.
    pub id: Uuid,
    /// The acting or affected user, if any.
    pub user_id: Option<Uuid>,
    /// The affected movie, if any.
    pub movie_id: Option<Uuid>,
    /// The affected review, if any.
    pub review_id: Option<Uuid>,
    /// Event kind, e.g. `review_created`.
    pub event: String,
    /// Free-text details.
    pub details: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// An audit entry that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLogEntry {
    /// The acting or affected user, if any.
    pub user_id: Option<Uuid>,
    /// The affected movie, if any.
    pub movie_id: Option<Uuid>,
    /// The affected review, if any.
    pub review_id: Option<Uuid>,
    /// Event kind.
    pub event: String,
    /// Free-text details.
    pub details: String,
}

/// Filters for listing audit entries. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditLogFilters {
    /// Exact event kind.
    pub event: Option<String>,
    /// Entries referencing this user.
    pub user_id: Option<Uuid>,
    /// Entries created at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Entries created at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

/// Persists audit entries.
#[async_trait]
pub trait AuditLogWriter: Send + Sync {
    /// Insert a new entry, returning it with its id and timestamp.
    async fn insert(&self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, DomainError>;
}

/// Reads audit entries, newest first.
#[async_trait]
pub trait AuditLogReader: Send + Sync {
    /// Returns one page of matching entries and the total match count.
    async fn list(
        &self,
        filters: &AuditLogFilters,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64), DomainError>;
}
