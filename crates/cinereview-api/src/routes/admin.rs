//! Admin dashboard: site statistics and the audit trail.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use chrono::{DateTime, Utc};
use cinereview_accounts::domain::stats::AdminStats;
use cinereview_core::audit::{AuditLogEntry, AuditLogFilters};
use cinereview_core::pagination::Paginated;
use serde::Deserialize;
use uuid::Uuid;

use super::page_request;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /audit-logs. `from` and `to` are RFC 3339
/// timestamps and both bounds are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub event: Option<String>,
    pub user_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /stats
async fn stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(state.admin.stats().await?))
}

/// GET /audit-logs
async fn audit_logs(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Paginated<AuditLogEntry>>, ApiError> {
    let filters = AuditLogFilters {
        event: query.event.filter(|e| !e.is_empty()),
        user_id: query.user_id,
        from: query.from,
        to: query.to,
    };
    Ok(Json(
        state
            .admin
            .audit_logs(&filters, page_request(query.page, query.limit))
            .await?,
    ))
}

/// Returns the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/audit-logs", get(audit_logs))
}
