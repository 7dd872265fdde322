//! # Scheduler: the context that owns the runtime and the well-known queues.
//!
//! A [`Scheduler`] replaces process-wide accessors with one explicit object.
//! It owns the tokio runtime (or borrows a handle), the event bus, the monitor
//! fan-out, the `main` and `background` queues, and a registry of the queues it
//! created.
//!
//! ## Architecture
//! ```text
//! Scheduler::builder(cfg).with_monitors(..).build()
//!     │
//!     ├─ Runtime (owned or borrowed Handle) ── timers, monitor workers, blocking pool
//!     ├─ main        : Serial     on WorkerThread ("<thread_name>-main")
//!     ├─ background  : Concurrent on BlockingPool
//!     ├─ registry    : Weak refs to queues from new_queue / new_concurrent_queue
//!     └─ listener    : Bus.subscribe() ─► MonitorSet::emit(&Event)
//!
//! Drop:
//!   release every live queue ─► cancel listener ─► runtime.shutdown_background()
//! ```
//!
//! ## Rules
//! - Queue names need not be unique; queues are identified by value.
//! - The registry holds queues weakly: a queue whose last [`TaskQueue`] clone is
//!   dropped cancels its pending tasks and disappears from [`Scheduler::queue_names`].
//! - [`Scheduler::current_queue`] resolves the queue whose task is running on the
//!   calling thread, falling back to `main`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event};
use crate::executor::{BlockingPool, Executor};
use crate::monitors::MonitorSet;
use crate::publish::{Publisher, SubscriptionPolicy};
use crate::queue::{QueueInner, QueueKind, TaskQueue};
use crate::runner::TaskRunner;

use super::{builder::SchedulerBuilder, config::SchedulerConfig};

/// Owner of the runtime, the well-known queues and the queue registry.
pub struct Scheduler {
    cfg: SchedulerConfig,
    bus: Bus,
    handle: Handle,
    runtime: Option<Runtime>,
    main: TaskQueue,
    background: TaskQueue,
    queues: Mutex<Vec<Weak<QueueInner>>>,
    monitors: Arc<MonitorSet>,
    token: CancellationToken,
}

impl Scheduler {
    /// Returns a builder for a scheduler with the given configuration.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_internal(
        cfg: SchedulerConfig,
        bus: Bus,
        handle: Handle,
        runtime: Option<Runtime>,
        main: TaskQueue,
        background: TaskQueue,
        monitors: Arc<MonitorSet>,
        events: broadcast::Receiver<Event>,
    ) -> Arc<Self> {
        let sched = Arc::new(Self {
            cfg,
            bus,
            handle,
            runtime,
            main,
            background,
            queues: Mutex::new(Vec::new()),
            monitors,
            token: CancellationToken::new(),
        });
        sched.monitor_listener(events);
        sched
    }

    /// Forwards bus events to the monitors until the scheduler is dropped.
    fn monitor_listener(&self, mut rx: broadcast::Receiver<Event>) {
        if self.monitors.is_empty() {
            return;
        }
        let set = Arc::clone(&self.monitors);
        let token = self.token.clone();
        self.handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    recv = rx.recv() => match recv {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(target: "taskline", skipped, "monitor listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    // ---------------------------
    // Queues
    // ---------------------------

    /// The serial queue bound to the dedicated main thread.
    pub fn main_queue(&self) -> TaskQueue {
        self.main.clone()
    }

    /// The concurrent queue bound to the blocking pool.
    pub fn background_queue(&self) -> TaskQueue {
        self.background.clone()
    }

    /// The queue whose task is running on the calling thread, else `main`.
    pub fn current_queue(&self) -> TaskQueue {
        if self.main.is_current() {
            return self.main.clone();
        }
        if self.background.is_current() {
            return self.background.clone();
        }
        self.live_queues()
            .into_iter()
            .find(TaskQueue::is_current)
            .unwrap_or_else(|| self.main.clone())
    }

    /// Creates a serial queue on the blocking pool.
    pub fn new_queue(&self, name: impl Into<Arc<str>>) -> TaskQueue {
        self.register(name.into(), QueueKind::Serial)
    }

    /// Creates a concurrent queue on the blocking pool running up to `width` tasks.
    pub fn new_concurrent_queue(&self, name: impl Into<Arc<str>>, width: usize) -> TaskQueue {
        self.register(name.into(), QueueKind::Concurrent { width })
    }

    /// Releases `queue` and drops it from the registry.
    ///
    /// The well-known queues are released too, after which they reject submissions.
    pub fn release_queue(&self, queue: &TaskQueue) {
        queue.release();
        let target = queue.downgrade();
        self.queues
            .lock()
            .retain(|w| w.strong_count() > 0 && !Weak::ptr_eq(w, &target));
    }

    /// Names of the live queues: `main`, `background`, then created queues in creation order.
    pub fn queue_names(&self) -> Vec<String> {
        let mut names = vec![self.main.name().to_string(), self.background.name().to_string()];
        names.extend(self.live_queues().iter().map(|q| q.name().to_string()));
        names
    }

    // ---------------------------
    // Runners
    // ---------------------------

    pub fn main_runner(&self) -> TaskRunner {
        TaskRunner::new(self.main_queue())
    }

    pub fn background_runner(&self) -> TaskRunner {
        TaskRunner::new(self.background_queue())
    }

    /// Runner over [`current_queue`](Self::current_queue).
    pub fn current_runner(&self) -> TaskRunner {
        TaskRunner::new(self.current_queue())
    }

    // ---------------------------
    // Plumbing
    // ---------------------------

    /// Event bus shared by every queue and publisher of this scheduler.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Handle of the runtime driving timers and the blocking pool.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Creates a publisher that reports on this scheduler's bus.
    pub fn publisher(&self, policy: impl SubscriptionPolicy) -> Publisher {
        Publisher::new(policy).with_bus(self.bus.clone())
    }

    fn register(&self, name: Arc<str>, kind: QueueKind) -> TaskQueue {
        let pool: Arc<dyn Executor> = Arc::new(BlockingPool::new(self.handle.clone()));
        let queue = TaskQueue::new(name, kind, pool, self.handle.clone(), self.bus.clone());

        let mut queues = self.queues.lock();
        queues.retain(|w| w.strong_count() > 0);
        queues.push(queue.downgrade());
        queue
    }

    fn live_queues(&self) -> Vec<TaskQueue> {
        self.queues
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .map(TaskQueue::from_inner)
            .collect()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for queue in self.live_queues() {
            queue.release();
        }
        self.background.release();
        self.main.release();
        self.token.cancel();

        if let Some(rt) = self.runtime.take() {
            rt.shutdown_background();
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("queues", &self.queue_names())
            .field("owned_runtime", &self.runtime.is_some())
            .field("monitors", &self.monitors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskState;
    use std::sync::mpsc;

    fn scheduler() -> Arc<Scheduler> {
        Scheduler::builder(SchedulerConfig {
            worker_threads: 1,
            background_width: 2,
            ..SchedulerConfig::default()
        })
        .build()
        .expect("scheduler")
    }

    #[test]
    fn test_well_known_queues() {
        let s = scheduler();
        assert_eq!(s.main_queue().name(), "main");
        assert!(s.main_queue().kind().is_serial());
        assert_eq!(s.background_queue().name(), "background");
        assert_eq!(s.background_queue().kind().width(), 2);
        assert!(s.main_queue().ptr_eq(s.main_runner().queue()));
    }

    #[test]
    fn test_current_queue_outside_tasks_is_main() {
        let s = scheduler();
        assert!(s.current_queue().ptr_eq(&s.main_queue()));
    }

    #[test]
    fn test_current_queue_inside_task() {
        let s = scheduler();
        let io = s.new_queue("io");
        let (tx, rx) = mpsc::channel();

        let inner = Arc::clone(&s);
        let expected = io.clone();
        io.submit_sync(move || {
            tx.send(inner.current_queue().ptr_eq(&expected)).ok();
        })
        .unwrap();
        assert!(rx.recv().unwrap());

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&s);
        s.background_queue()
            .submit_sync(move || {
                tx.send(inner.current_runner().queue().name().to_string()).ok();
            })
            .unwrap();
        assert_eq!(rx.recv().unwrap(), "background");
    }

    #[test]
    fn test_registry_tracks_live_queues() {
        let s = scheduler();
        let a = s.new_queue("a");
        let b = s.new_concurrent_queue("b", 3);
        assert_eq!(s.queue_names(), vec!["main", "background", "a", "b"]);

        drop(b);
        assert_eq!(s.queue_names(), vec!["main", "background", "a"]);

        s.release_queue(&a);
        assert!(a.is_released());
        assert_eq!(s.queue_names(), vec!["main", "background"]);
    }

    #[test]
    fn test_dropping_scheduler_cancels_pending() {
        let s = scheduler();
        let q = s.new_queue("pending");
        q.pause();
        let h = q.submit_async(|| {}).unwrap();

        drop(s);
        assert_eq!(h.state(), TaskState::Cancelled);
        assert!(q.submit_async(|| {}).is_err());
    }
}
