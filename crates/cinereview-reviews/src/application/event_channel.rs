//! Bounded in-memory queue carrying review events to the consumer.
//!
//! Sending never waits: when the queue is full the event is dropped so a
//! slow consumer cannot hold review mutations hostage.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use crate::domain::events::ReviewEvent;

/// Capacity used when none is configured.
pub const DEFAULT_REVIEW_EVENT_CAPACITY: usize = 100;

/// What happened to an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The event is queued for the consumer.
    Enqueued,
    /// The queue was full; the event was dropped.
    DroppedFull,
    /// The consumer is gone; the event was dropped.
    DroppedClosed,
}

/// Producer half. Cheap to clone; safe for concurrent producers.
#[derive(Debug, Clone)]
pub struct ReviewEventSender {
    inner: mpsc::Sender<ReviewEvent>,
}

impl ReviewEventSender {
    /// Enqueues `event` without waiting.
    pub fn emit(&self, event: ReviewEvent) -> EmitOutcome {
        match self.inner.try_send(event) {
            Ok(()) => EmitOutcome::Enqueued,
            Err(TrySendError::Full(event)) => {
                warn!(
                    event_type = event.kind.event_type(),
                    review_id = %event.review_id,
                    "review event channel full; dropping event"
                );
                EmitOutcome::DroppedFull
            }
            Err(TrySendError::Closed(event)) => {
                warn!(
                    event_type = event.kind.event_type(),
                    review_id = %event.review_id,
                    "review event consumer stopped; dropping event"
                );
                EmitOutcome::DroppedClosed
            }
        }
    }
}

/// Consumer half, owned by exactly one consumer task.
#[derive(Debug)]
pub struct ReviewEventReceiver {
    inner: mpsc::Receiver<ReviewEvent>,
}

impl ReviewEventReceiver {
    /// Waits for the next event. Returns `None` once every sender is gone
    /// and the queue is drained.
    pub async fn recv(&mut self) -> Option<ReviewEvent> {
        self.inner.recv().await
    }

    /// Takes the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ReviewEvent> {
        self.inner.try_recv().ok()
    }
}

/// Creates a FIFO review event channel holding at most `capacity` events
/// (at least one).
#[must_use]
pub fn review_event_channel(capacity: usize) -> (ReviewEventSender, ReviewEventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ReviewEventSender { inner: tx },
        ReviewEventReceiver { inner: rx },
    )
}
