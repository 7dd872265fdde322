//! # Core monitor trait
//!
//! `Monitor` is the extension point for plugging custom event handlers into the
//! runtime. Each monitor is driven by a dedicated worker loop fed by a bounded
//! queue that is owned by the [`MonitorSet`](crate::MonitorSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) – they do **not** block the
//!   task queues nor other monitors.
//! - Each monitor **declares** its preferred queue capacity via
//!   [`Monitor::queue_capacity`]. If a queue overflows, events for that
//!   monitor are **dropped** and a `MonitorOverflow` event is published.
//!
//! ## Example
//! ```rust
//! use taskline::{Event, EventKind, Monitor};
//! use async_trait::async_trait;
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Monitor for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::TaskFailed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for runtime event monitors.
///
/// Called from a monitor-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Monitor: Send + Sync + 'static {
    /// Handle a single event for this monitor.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this monitor's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
