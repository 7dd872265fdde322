//! # LogWriter - tracing event renderer
//!
//! A minimal monitor that renders incoming [`Event`]s through `tracing`.
//! Task failures and monitor faults are logged at `warn`, everything else at `debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG taskline: submitted queue="io" task=3 delay_ms=Some(250)
//! DEBUG taskline: starting queue="io" task=3
//!  WARN taskline: failed queue="io" task=3 err="boom"
//! DEBUG taskline: cancelled queue="io" task=4 reason="released"
//! ```

use crate::events::{Event, EventKind};
use crate::monitors::Monitor;
use async_trait::async_trait;

/// Event writer monitor.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Monitor for LogWriter {
    async fn on_event(&self, e: &Event) {
        let queue = e.queue.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::TaskSubmitted => {
                tracing::debug!(target: "taskline", seq = e.seq, queue, task = ?e.task, delay_ms = ?e.delay_ms, "submitted");
            }
            EventKind::TaskStarting => {
                tracing::debug!(target: "taskline", seq = e.seq, queue, task = ?e.task, "starting");
            }
            EventKind::TaskCompleted => {
                tracing::debug!(target: "taskline", seq = e.seq, queue, task = ?e.task, "completed");
            }
            EventKind::TaskFailed => {
                tracing::warn!(target: "taskline", seq = e.seq, queue, task = ?e.task, err = reason, "failed");
            }
            EventKind::TaskCancelled => {
                tracing::debug!(target: "taskline", seq = e.seq, queue, task = ?e.task, reason, "cancelled");
            }
            EventKind::QueueCreated
            | EventKind::QueuePaused
            | EventKind::QueueResumed
            | EventKind::QueueReleased => {
                tracing::debug!(target: "taskline", seq = e.seq, queue, kind = ?e.kind, "queue");
            }
            EventKind::ObserverSubscribed
            | EventKind::ObserverUnsubscribed
            | EventKind::SubscriptionRejected => {
                tracing::debug!(target: "taskline", seq = e.seq, kind = ?e.kind, capabilities = reason, "subscription");
            }
            EventKind::DeliveryPanicked => {
                tracing::warn!(target: "taskline", seq = e.seq, info = reason, "delivery-panicked");
            }
            EventKind::MonitorOverflow => {
                tracing::warn!(target: "taskline", seq = e.seq, monitor = ?e.source, reason, "monitor-overflow");
            }
            EventKind::MonitorPanicked => {
                tracing::warn!(
                    target: "taskline",
                    seq = e.seq,
                    monitor = e.source.unwrap_or("unknown"),
                    info = reason,
                    "monitor-panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
