//! Background consumer that performs the side effects of review mutations.
//!
//! For every event it recomputes the movie's average rating and writes an
//! audit entry. The two effects are attempted independently; failures are
//! logged and the loop moves on. There is no retry and no dead-letter queue:
//! the average is recomputable from the review rows at any later time.

use std::sync::Arc;

use cinereview_core::audit::{AuditLogWriter, NewAuditLogEntry};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::application::event_channel::ReviewEventReceiver;
use crate::domain::events::ReviewEvent;
use crate::ports::MovieAggregateUpdater;

/// Drains the review event channel until shutdown is signalled.
pub struct ReviewEventConsumer {
    receiver: ReviewEventReceiver,
    aggregates: Arc<dyn MovieAggregateUpdater>,
    audit: Option<Arc<dyn AuditLogWriter>>,
    shutdown: watch::Receiver<bool>,
}

impl ReviewEventConsumer {
    /// Creates a consumer. Send `true` on the paired `watch::Sender` (or
    /// drop it) to stop the consumer.
    #[must_use]
    pub fn new(
        receiver: ReviewEventReceiver,
        aggregates: Arc<dyn MovieAggregateUpdater>,
        audit: Option<Arc<dyn AuditLogWriter>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            receiver,
            aggregates,
            audit,
            shutdown,
        }
    }

    /// Runs the consumer on its own task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Receive loop. Returns when shutdown is signalled, the shutdown sender
    /// is dropped, or every event sender is gone.
    pub async fn run(mut self) {
        info!("review event consumer started");

        while !*self.shutdown.borrow() {
            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        debug!("shutdown sender dropped");
                        break;
                    }
                }
                next = self.receiver.recv() => {
                    let Some(event) = next else {
                        debug!("all review event senders dropped");
                        break;
                    };
                    handle_review_event(
                        &event,
                        self.aggregates.as_ref(),
                        self.audit.as_deref(),
                    )
                    .await;
                }
            }
        }

        info!("review event consumer stopped");
    }
}

/// Performs both side effects for one event.
///
/// Aggregate recomputation is skipped when the event has no movie
/// reference. A failure in one effect never prevents the other.
pub async fn handle_review_event(
    event: &ReviewEvent,
    aggregates: &dyn MovieAggregateUpdater,
    audit: Option<&dyn AuditLogWriter>,
) {
    if !event.movie_id.is_nil() {
        if let Err(e) = aggregates.recompute_average_rating(event.movie_id).await {
            error!(
                movie_id = %event.movie_id,
                review_id = %event.review_id,
                error = %e,
                "average rating recompute failed"
            );
        }
    }

    let Some(audit) = audit else {
        return;
    };

    let entry = audit_entry_for(event);
    if let Err(e) = audit.insert(&entry).await {
        error!(
            event_type = %entry.event,
            review_id = %event.review_id,
            error = %e,
            "audit log insert failed"
        );
    }
}

/// Builds the audit entry for an event, mapping nil references to absent.
#[must_use]
pub fn audit_entry_for(event: &ReviewEvent) -> NewAuditLogEntry {
    NewAuditLogEntry {
        user_id: reference(event.user_id),
        movie_id: reference(event.movie_id),
        review_id: reference(event.review_id),
        event: event.kind.event_type().to_owned(),
        details: String::new(),
    }
}

fn reference(id: Uuid) -> Option<Uuid> {
    (!id.is_nil()).then_some(id)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::events::ReviewEventKind;

    #[test]
    fn test_audit_entry_maps_nil_references_to_none() {
        let review_id = Uuid::new_v4();
        let event = ReviewEvent {
            kind: ReviewEventKind::Deleted,
            movie_id: Uuid::nil(),
            user_id: Uuid::nil(),
            review_id,
            occurred_at: Utc::now(),
        };

        let entry = audit_entry_for(&event);

        assert_eq!(entry.user_id, None);
        assert_eq!(entry.movie_id, None);
        assert_eq!(entry.review_id, Some(review_id));
        assert_eq!(entry.event, "review_deleted");
        assert!(entry.details.is_empty());
    }

    #[test]
    fn test_audit_entry_keeps_present_references() {
        let event = ReviewEvent {
            kind: ReviewEventKind::Created,
            movie_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            review_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        };

        let entry = audit_entry_for(&event);

        assert_eq!(entry.user_id, Some(event.user_id));
        assert_eq!(entry.movie_id, Some(event.movie_id));
        assert_eq!(entry.review_id, Some(event.review_id));
        assert_eq!(entry.event, "review_created");
    }
}
