//! Audit log doubles.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use cinereview_core::audit::{
    AuditLogEntry, AuditLogFilters, AuditLogReader, AuditLogWriter, NewAuditLogEntry,
};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use uuid::Uuid;

fn persisted(entry: &NewAuditLogEntry) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::new_v4(),
        user_id: entry.user_id,
        movie_id: entry.movie_id,
        review_id: entry.review_id,
        event: entry.event.clone(),
        details: entry.details.clone(),
        created_at: Utc::now(),
    }
}

/// An audit writer that records every entry and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingAuditLogWriter {
    entries: Mutex<Vec<NewAuditLogEntry>>,
}

impl RecordingAuditLogWriter {
    /// Creates a writer with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries passed to `insert`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn entries(&self) -> Vec<NewAuditLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditLogWriter for RecordingAuditLogWriter {
    async fn insert(&self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, DomainError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(persisted(entry))
    }
}

/// An audit writer that records every entry and then fails.
#[derive(Debug, Default)]
pub struct FailingAuditLogWriter {
    attempts: Mutex<Vec<NewAuditLogEntry>>,
}

impl FailingAuditLogWriter {
    /// Creates a writer with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries passed to `insert`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn attempts(&self) -> Vec<NewAuditLogEntry> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditLogWriter for FailingAuditLogWriter {
    async fn insert(&self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, DomainError> {
        self.attempts.lock().unwrap().push(entry.clone());
        Err(DomainError::Infrastructure("audit insert failed".into()))
    }
}

/// An audit log that stores entries and serves filtered, newest-first
/// pages.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored entry in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditLogWriter for InMemoryAuditLog {
    async fn insert(&self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, DomainError> {
        let stored = persisted(entry);
        self.entries.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl AuditLogReader for InMemoryAuditLog {
    async fn list(
        &self,
        filters: &AuditLogFilters,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64), DomainError> {
        let mut matching: Vec<AuditLogEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                filters.event.as_ref().is_none_or(|event| &e.event == event)
                    && filters.user_id.is_none_or(|id| e.user_id == Some(id))
                    && filters.from.is_none_or(|from| e.created_at >= from)
                    && filters.to.is_none_or(|to| e.created_at <= to)
            })
            .cloned()
            .collect();
        matching.reverse();

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(0);
        Ok((matching.into_iter().skip(skip).take(take).collect(), total))
    }
}
