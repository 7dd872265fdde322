use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;

use crate::error::ScheduleError;
use crate::events::{Bus, Event, EventKind};
use crate::executor::Executor;
use crate::queue::{QueueInner, QueueKind};
use crate::tasks::{Schedule, SubmitMode, TaskHandle};

/// Named ordered sequence of pending tasks bound to one executor.
///
/// Cloning is cheap; all clones refer to the same queue.
///
/// Tasks are dequeued strictly in submission order. A task whose scheduled
/// time has not yet arrived blocks the tasks behind it, even if theirs has.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use taskline::{BlockingPool, Bus, QueueKind, TaskQueue};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let queue = TaskQueue::new(
///     "io",
///     QueueKind::Serial,
///     std::sync::Arc::new(BlockingPool::new(rt.handle().clone())),
///     rt.handle().clone(),
///     Bus::default(),
/// );
///
/// queue.submit_async(|| println!("first")).unwrap();
/// queue.submit_after(|| println!("100ms after first"), Duration::from_millis(100)).unwrap();
/// ```
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

impl TaskQueue {
    /// Creates a queue bound to `executor`.
    ///
    /// `runtime` drives the delay timers; `bus` receives the queue's lifecycle events.
    pub fn new(
        name: impl Into<Arc<str>>,
        kind: QueueKind,
        executor: Arc<dyn Executor>,
        runtime: Handle,
        bus: Bus,
    ) -> Self {
        let name = name.into();
        bus.publish(
            Event::new(EventKind::QueueCreated)
                .with_queue(Arc::clone(&name))
                .with_source(executor.name()),
        );
        Self {
            inner: QueueInner::new(name, kind, executor, runtime, bus),
        }
    }

    /// Submits `f` with no delay.
    ///
    /// In [`SubmitMode::Sync`] the call blocks until `f` finished, and fails with
    /// [`ScheduleError::DeadlockRisk`] if issued from a task already running on this
    /// serial queue.
    pub fn submit<F>(&self, f: F, mode: SubmitMode) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        match mode {
            SubmitMode::Async => self.inner.enqueue(Box::new(f), Schedule::Now),
            SubmitMode::Sync => self.inner.submit_sync(Box::new(f)),
        }
    }

    /// Shorthand for `submit(f, SubmitMode::Async)`.
    pub fn submit_async<F>(&self, f: F) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(f, SubmitMode::Async)
    }

    /// Shorthand for `submit(f, SubmitMode::Sync)`.
    pub fn submit_sync<F>(&self, f: F) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(f, SubmitMode::Sync)
    }

    /// Submits `f` to start `delay` after the later of now and the completion of
    /// the task that runs before it on this queue.
    pub fn submit_after<F>(&self, f: F, delay: Duration) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.enqueue(Box::new(f), Schedule::After(delay))
    }

    /// Submits `f` to start no earlier than `at`. A past instant means "now".
    pub fn submit_at<F>(&self, f: F, at: Instant) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.enqueue(Box::new(f), Schedule::At(at))
    }

    /// Submits `f` with an explicit [`Schedule`].
    pub fn submit_scheduled<F>(&self, f: F, schedule: Schedule) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.enqueue(Box::new(f), schedule)
    }

    /// Stops dequeuing. Running tasks are not interrupted.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Resumes dequeuing.
    pub fn resume(&self) {
        self.inner.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.inner.is_paused()
    }

    /// Cancels every pending task; running tasks are unaffected.
    ///
    /// Returns the number of tasks cancelled.
    pub fn cancel_all(&self) -> usize {
        self.inner.cancel_all()
    }

    /// Cancels one task if it is still pending on this queue.
    pub fn cancel(&self, handle: &TaskHandle) -> bool {
        handle.belongs_to(&self.inner) && self.inner.cancel_id(handle.id())
    }

    /// Cancels pending tasks and rejects every later submission.
    pub fn release(&self) {
        self.inner.release();
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_released()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    #[inline]
    pub fn kind(&self) -> QueueKind {
        self.inner.kind()
    }

    /// Number of tasks waiting to be dequeued.
    pub fn pending_len(&self) -> usize {
        self.inner.pending_len()
    }

    /// Number of tasks currently running.
    pub fn running_len(&self) -> usize {
        self.inner.running_len()
    }

    /// True if both values refer to the same queue.
    pub fn ptr_eq(&self, other: &TaskQueue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// True if the calling thread is currently running a task of this queue.
    pub fn is_current(&self) -> bool {
        self.inner.is_running_on(std::thread::current().id())
    }

    pub(crate) fn downgrade(&self) -> Weak<QueueInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Arc<QueueInner>) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.inner.name())
            .field("kind", &self.inner.kind())
            .field("executor", &self.inner.executor_name())
            .finish()
    }
}
