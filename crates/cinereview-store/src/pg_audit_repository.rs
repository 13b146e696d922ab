//! `PostgreSQL` implementation of the audit log writer and reader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_core::audit::{
    AuditLogEntry, AuditLogFilters, AuditLogReader, AuditLogWriter, NewAuditLogEntry,
};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::infrastructure;

const AUDIT_COLUMNS: &str = "id, user_id, movie_id, review_id, event, details, created_at";

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    user_id: Option<Uuid>,
    movie_id: Option<Uuid>,
    review_id: Option<Uuid>,
    event: String,
    details: String,
    created_at: DateTime<Utc>,
}

impl From<AuditLogRow> for AuditLogEntry {
    fn from(row: AuditLogRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            movie_id: row.movie_id,
            review_id: row.review_id,
            event: row.event,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &AuditLogFilters) {
    query.push(" WHERE TRUE");
    if let Some(event) = filters.event.as_deref().filter(|e| !e.is_empty()) {
        query.push(" AND event = ").push_bind(event.to_owned());
    }
    if let Some(user_id) = filters.user_id {
        query.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(from) = filters.from {
        query.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        query.push(" AND created_at <= ").push_bind(to);
    }
}

/// PostgreSQL-backed audit trail.
#[derive(Debug, Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Creates a new `PgAuditLogRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogWriter for PgAuditLogRepository {
    async fn insert(&self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, DomainError> {
        let row: AuditLogRow = sqlx::query_as(&format!(
            "INSERT INTO audit_logs (id, user_id, movie_id, review_id, event, details) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {AUDIT_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(entry.user_id)
        .bind(entry.movie_id)
        .bind(entry.review_id)
        .bind(&entry.event)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.into())
    }
}

#[async_trait]
impl AuditLogReader for PgAuditLogRepository {
    async fn list(
        &self,
        filters: &AuditLogFilters,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64), DomainError> {
        let mut count: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
        push_filters(&mut count, filters);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)?;

        let mut select: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {AUDIT_COLUMNS} FROM audit_logs"));
        push_filters(&mut select, filters);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<AuditLogRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?;

        Ok((rows.into_iter().map(AuditLogEntry::from).collect(), total))
    }
}
