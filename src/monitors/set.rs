//! # Non-blocking event fan-out to multiple monitors.
//!
//! Provides [`MonitorSet`] - distributes events to multiple monitors
//! concurrently without blocking the emitting queue or publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► monitor1.on_event()
//!     │    (bounded)         └──────► panic → MonitorPanicked
//!     ├──► [queue 2] ──► worker 2 ──► monitor2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► monitorN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-monitor ordering**: monitor A may process event N while B processes N+5
//! - **Overflow**: event dropped for that monitor only, `MonitorOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking monitor doesn't affect others
//! - **Per-monitor FIFO**: each monitor sees events in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a monitor panics while holding a lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};
use crate::monitors::Monitor;

/// Per-monitor channel metadata.
struct MonitorChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for multiple event monitors.
pub struct MonitorSet {
    channels: Vec<MonitorChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl MonitorSet {
    /// Creates a new set and spawns one worker task per monitor on `rt`.
    ///
    /// Minimum queue capacity is 1 (enforced).
    #[must_use]
    pub fn new(monitors: Vec<Arc<dyn Monitor>>, bus: Bus, rt: &Handle) -> Self {
        let mut channels = Vec::with_capacity(monitors.len());
        let mut workers = Vec::with_capacity(monitors.len());

        for monitor in monitors {
            let cap = monitor.queue_capacity().max(1);
            let name = monitor.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let bus_for_worker = bus.clone();

            let handle = rt.spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = monitor.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = crate::error::panic_message(panic_err.as_ref());
                        bus_for_worker.publish(Event::monitor_panicked(monitor.name(), info));
                    }
                }
            });
            channels.push(MonitorChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Number of monitors in the set.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an event to all monitors (clones the event once into an `Arc`).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a pre-allocated `Arc<Event>` to all monitors.
    ///
    /// `MonitorOverflow` events are not re-published when they themselves overflow.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow_evt = event.is_monitor_overflow();

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow_evt {
                        self.bus.publish(Event::monitor_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.bus.publish(Event::monitor_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// Gracefully shuts down all monitor workers.
    ///
    /// Drops every sender, then awaits the workers draining their queues.
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Monitor for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploding;

    #[async_trait]
    impl Monitor for Exploding {
        async fn on_event(&self, _ev: &Event) {
            panic!("monitor exploded");
        }
        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    #[tokio::test]
    async fn test_events_reach_every_monitor_in_order() {
        let bus = Bus::new(16);
        let rec = Arc::new(Recorder::default());
        let monitors: Vec<Arc<dyn Monitor>> = vec![rec.clone()];
        let set = MonitorSet::new(monitors, bus, &Handle::current());

        set.emit(&Event::new(EventKind::QueuePaused));
        set.emit(&Event::new(EventKind::QueueResumed));
        set.shutdown().await;

        assert_eq!(
            *rec.seen.lock(),
            vec![EventKind::QueuePaused, EventKind::QueueResumed]
        );
    }

    #[tokio::test]
    async fn test_panicking_monitor_is_isolated() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let rec = Arc::new(Recorder::default());
        let monitors: Vec<Arc<dyn Monitor>> = vec![Arc::new(Exploding), rec.clone()];
        let set = MonitorSet::new(monitors, bus, &Handle::current());

        set.emit(&Event::new(EventKind::TaskCompleted));
        set.shutdown().await;

        assert_eq!(*rec.seen.lock(), vec![EventKind::TaskCompleted]);
        let ev = rx.recv().await.expect("panic event");
        assert_eq!(ev.kind, EventKind::MonitorPanicked);
        assert_eq!(ev.source, Some("exploding"));
        assert_eq!(ev.reason.as_deref(), Some("monitor exploded"));
    }
}
