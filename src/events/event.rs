//! # Runtime events emitted by queues and publishers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task lifecycle**: submitted, starting, completed, failed, cancelled
//! - **Queue control**: created, paused, resumed, released
//! - **Delivery**: observer (un)subscribed, subscription rejected, delivery and monitor faults
//!
//! The [`Event`] struct carries additional metadata such as timestamps, queue and
//! task identity, reasons and scheduling delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskline::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_queue("io")
//!     .with_task(7)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.queue.as_deref(), Some("io"));
//! assert_eq!(ev.task, Some(7));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle ===
    /// Task accepted by a queue and now Pending.
    ///
    /// Sets: `queue`, `task`, `delay_ms` (only for delayed/absolute submissions).
    TaskSubmitted,

    /// Task dequeued and about to run on the executor.
    ///
    /// Sets: `queue`, `task`.
    TaskStarting,

    /// Task closure returned normally.
    ///
    /// Sets: `queue`, `task`.
    TaskCompleted,

    /// Task closure panicked; the task is now Failed.
    ///
    /// Sets: `queue`, `task`, `reason`.
    TaskFailed,

    /// Pending task removed before it started.
    ///
    /// Sets: `queue`, `task`, `reason` (`cancel`, `cancel_all`, `released`).
    TaskCancelled,

    // === Queue control ===
    /// Queue registered with the scheduler.
    ///
    /// Sets: `queue`.
    QueueCreated,

    /// Queue stopped dequeuing new tasks.
    ///
    /// Sets: `queue`.
    QueuePaused,

    /// Queue resumed dequeuing.
    ///
    /// Sets: `queue`.
    QueueResumed,

    /// Queue released; pending tasks cancelled, new submissions rejected.
    ///
    /// Sets: `queue`.
    QueueReleased,

    // === Publisher delivery ===
    /// Observer registered for at least one capability.
    ///
    /// Sets: `reason` (accepted capability names).
    ObserverSubscribed,

    /// Observer removed from every capability.
    ///
    /// Sets: `reason` (removed capability names).
    ObserverUnsubscribed,

    /// `on_subscribe` hook declined a capability.
    ///
    /// Sets: `reason` (capability name).
    SubscriptionRejected,

    /// An observer panicked while a broadcast was delivered to it.
    ///
    /// Sets: `reason` (capability and panic message).
    DeliveryPanicked,

    // === Monitor events ===
    /// Monitor panicked during event processing.
    ///
    /// Sets: `source` (monitor name), `reason` (panic message).
    MonitorPanicked,

    /// Monitor dropped an event (queue full or worker closed).
    ///
    /// Sets: `source` (monitor name), `reason` ("full", "closed").
    MonitorOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the queue, if applicable.
    pub queue: Option<Arc<str>>,
    /// Task id, if applicable.
    pub task: Option<u64>,
    /// Scheduling delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, capability names).
    pub reason: Option<Arc<str>>,
    /// Name of the emitting component (monitor name for monitor events).
    pub source: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            queue: None,
            task: None,
            delay_ms: None,
            reason: None,
            source: None,
        }
    }

    /// Attaches a queue name.
    #[inline]
    pub fn with_queue(mut self, queue: impl Into<Arc<str>>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task(mut self, task: u64) -> Self {
        self.task = Some(task);
        self
    }

    /// Attaches a scheduling delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitting component name.
    #[inline]
    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    /// Creates a monitor overflow event.
    #[inline]
    pub fn monitor_overflow(monitor: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::MonitorOverflow)
            .with_source(monitor)
            .with_reason(format!("monitor={monitor} reason={reason}"))
    }

    /// Creates a monitor panic event.
    #[inline]
    pub fn monitor_panicked(monitor: &'static str, info: String) -> Self {
        Event::new(EventKind::MonitorPanicked)
            .with_source(monitor)
            .with_reason(info)
    }

    #[inline]
    pub fn is_monitor_overflow(&self) -> bool {
        matches!(self.kind, EventKind::MonitorOverflow)
    }

    /// True for the task lifecycle kinds.
    #[inline]
    pub fn is_task_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskSubmitted
                | EventKind::TaskStarting
                | EventKind::TaskCompleted
                | EventKind::TaskFailed
                | EventKind::TaskCancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::QueuePaused);
        let b = Event::new(EventKind::QueueResumed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates() {
        let ev = Event::new(EventKind::TaskSubmitted).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_monitor_overflow_helper() {
        let ev = Event::monitor_overflow("audit", "full");
        assert!(ev.is_monitor_overflow());
        assert!(!ev.is_task_event());
        assert_eq!(ev.source, Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("monitor=audit reason=full"));
    }
}
