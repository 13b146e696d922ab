//! Admin dashboard queries.

use std::sync::Arc;

use chrono::Duration;
use cinereview_core::audit::{AuditLogEntry, AuditLogFilters, AuditLogReader};
use cinereview_core::clock::SharedClock;
use cinereview_core::error::DomainError;
use cinereview_core::pagination::{PageRequest, Paginated};

use crate::domain::stats::AdminStats;
use crate::ports::StatsReader;

/// Page size for audit listings when none is requested.
pub const DEFAULT_AUDIT_LOG_LIMIT: i64 = 20;

/// Window for the "recent" dashboard counters.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Site statistics and audit trail.
#[derive(Clone)]
pub struct AdminService {
    stats: Arc<dyn StatsReader>,
    audit: Arc<dyn AuditLogReader>,
    clock: SharedClock,
}

impl AdminService {
    /// Creates a new `AdminService`.
    #[must_use]
    pub fn new(
        stats: Arc<dyn StatsReader>,
        audit: Arc<dyn AuditLogReader>,
        clock: SharedClock,
    ) -> Self {
        Self {
            stats,
            audit,
            clock,
        }
    }

    /// Totals and last-seven-days counters.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn stats(&self) -> Result<AdminStats, DomainError> {
        let since = self.clock.now() - Duration::days(RECENT_WINDOW_DAYS);
        self.stats.admin_stats(since).await
    }

    /// One page of audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn audit_logs(
        &self,
        filters: &AuditLogFilters,
        page: PageRequest,
    ) -> Result<Paginated<AuditLogEntry>, DomainError> {
        let page = page.normalized(DEFAULT_AUDIT_LOG_LIMIT);
        let (entries, total) = self.audit.list(filters, page).await?;
        Ok(Paginated::new(entries, total, page))
    }
}
