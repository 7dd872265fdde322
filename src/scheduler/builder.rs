use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::RuntimeError;
use crate::events::Bus;
use crate::executor::{BlockingPool, Executor, WorkerThread};
use crate::monitors::{Monitor, MonitorSet};
use crate::queue::{QueueKind, TaskQueue};

use super::{config::SchedulerConfig, scheduler::Scheduler};

/// Name of the well-known serial queue bound to the dedicated main thread.
pub const MAIN_QUEUE: &str = "main";
/// Name of the well-known concurrent queue bound to the blocking pool.
pub const BACKGROUND_QUEUE: &str = "background";

/// Builder for constructing a [`Scheduler`] with optional features.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    monitors: Vec<Arc<dyn Monitor>>,
    runtime: Option<Handle>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            monitors: Vec::new(),
            runtime: None,
        }
    }

    /// Sets event monitors for observability.
    ///
    /// Monitors receive runtime events (task lifecycle, queue control, delivery faults)
    /// through dedicated workers with bounded queues.
    pub fn with_monitors(mut self, monitors: Vec<Arc<dyn Monitor>>) -> Self {
        self.monitors = monitors;
        self
    }

    /// Runs timers, monitors and background tasks on an existing runtime
    /// instead of an owned one.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds and returns the Scheduler instance.
    ///
    /// This consumes the builder and initializes:
    /// - the tokio runtime (owned, unless one was given)
    /// - the event bus and monitor workers
    /// - the `main` queue (serial, dedicated thread) and the `background` queue
    ///   (concurrent, blocking pool)
    pub fn build(self) -> Result<Arc<Scheduler>, RuntimeError> {
        let (owned, handle) = match self.runtime {
            Some(handle) => (None, handle),
            None => {
                let rt = build_runtime(&self.cfg)?;
                let handle = rt.handle().clone();
                (Some(rt), handle)
            }
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let monitors = Arc::new(MonitorSet::new(self.monitors, bus.clone(), &handle));
        // Subscribed before the well-known queues exist so monitors see their creation.
        let events = bus.subscribe();

        let worker = WorkerThread::spawn(format!("{}-{}", self.cfg.thread_name, MAIN_QUEUE))?;
        let main = TaskQueue::new(
            MAIN_QUEUE,
            QueueKind::Serial,
            Arc::new(worker),
            handle.clone(),
            bus.clone(),
        );

        let pool: Arc<dyn Executor> = Arc::new(BlockingPool::new(handle.clone()));
        let background = TaskQueue::new(
            BACKGROUND_QUEUE,
            QueueKind::Concurrent {
                width: self.cfg.background_width_resolved(),
            },
            pool,
            handle.clone(),
            bus.clone(),
        );

        tracing::debug!(
            target: "taskline",
            owned_runtime = owned.is_some(),
            monitors = monitors.len(),
            background_width = background.kind().width(),
            "scheduler built"
        );

        Ok(Scheduler::new_internal(
            self.cfg, bus, handle, owned, main, background, monitors, events,
        ))
    }
}

fn build_runtime(cfg: &SchedulerConfig) -> Result<Runtime, RuntimeError> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all().thread_name(cfg.thread_name.clone());
    if let Some(n) = cfg.worker_threads() {
        builder.worker_threads(n);
    }
    if let Some(n) = cfg.max_blocking_threads() {
        builder.max_blocking_threads(n);
    }
    Ok(builder.build()?)
}
