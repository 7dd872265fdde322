//! # Queue engine: pending sequence, dispatch and timers.
//!
//! [`QueueInner`] owns the shared mutable state of one queue behind a single
//! `parking_lot::Mutex`. Every mutation (submit, cancel, pause/resume, release)
//! and the dequeue step itself run under that lock; no lock is shared between queues.
//!
//! ## Dispatch loop
//! ```text
//! pump():
//!   lock
//!   while !paused && !released && running < width:
//!     head = pending.front()              (FIFO, never skipped)
//!     ├─ deadline(head) > now ─► arm timer(deadline), stop
//!     └─ pop head, running += 1, state = Running
//!   unlock
//!   executor.run(dispatch) for each popped task, in pop order
//!
//! dispatch (on executor thread):
//!   record thread ─► TaskStarting ─► catch_unwind(job)
//!   lock: running -= 1, anchor = now, state = Completed | Failed
//!   pump()
//! ```
//!
//! ## Rules
//! - An ineligible head blocks the tasks behind it (dequeue order is submission order).
//! - `pump()` is called after every submit, completion, resume, cancel and timer tick.
//! - A job the executor drops without running is recorded as Cancelled and frees its slot.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::error::{ScheduleError, TaskError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::executor::Executor;
use crate::queue::QueueKind;
use crate::tasks::{Job, Schedule, TaskCell, TaskHandle, TaskId, TaskState};

/// A task waiting in the pending sequence.
struct PendingTask {
    cell: TaskCell,
    job: Job,
    schedule: Schedule,
    submitted: Instant,
    /// Fixed the first time the task is considered for dequeue.
    deadline: Option<Instant>,
}

/// Mutable queue state, guarded by [`QueueInner::state`].
#[derive(Default)]
struct QueueState {
    pending: VecDeque<PendingTask>,
    paused: bool,
    released: bool,
    running: usize,
    /// Threads currently executing a task of this queue.
    running_threads: Vec<ThreadId>,
    /// Completion instant of the most recently finished task.
    anchor: Option<Instant>,
    /// Earliest armed timer, if any.
    timer: Option<Instant>,
}

pub(crate) struct QueueInner {
    name: Arc<str>,
    kind: QueueKind,
    executor: Arc<dyn Executor>,
    timers: Handle,
    bus: Bus,
    state: Mutex<QueueState>,
}

impl QueueInner {
    pub(crate) fn new(
        name: Arc<str>,
        kind: QueueKind,
        executor: Arc<dyn Executor>,
        timers: Handle,
        bus: Bus,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            kind,
            executor,
            timers,
            bus,
            state: Mutex::new(QueueState::default()),
        })
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    #[inline]
    pub(crate) fn kind(&self) -> QueueKind {
        self.kind
    }

    pub(crate) fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    // ---------------------------
    // Submission
    // ---------------------------

    /// Appends a task to the pending sequence and pumps.
    pub(crate) fn enqueue(
        self: &Arc<Self>,
        job: Job,
        schedule: Schedule,
    ) -> Result<TaskHandle, ScheduleError> {
        let cell = TaskCell::new();
        let handle = TaskHandle::new(&cell, self);
        let now = Instant::now();
        {
            let mut st = self.state.lock();
            if st.released {
                return Err(self.rejected());
            }
            self.publish_submitted(cell.id(), schedule, now);
            st.pending.push_back(PendingTask {
                cell,
                job,
                schedule,
                submitted: now,
                deadline: None,
            });
        }
        self.pump();
        Ok(handle)
    }

    /// Runs `job` and blocks until it finished.
    ///
    /// If the queue is idle the job goes straight to [`Executor::run_and_wait`];
    /// otherwise it is enqueued behind the pending tasks and the caller waits on its state.
    pub(crate) fn submit_sync(self: &Arc<Self>, job: Job) -> Result<TaskHandle, ScheduleError> {
        let caller = thread::current().id();
        let cell = TaskCell::new();
        let handle = TaskHandle::new(&cell, self);
        let now = Instant::now();

        let direct = {
            let mut st = self.state.lock();
            if st.released {
                return Err(self.rejected());
            }
            // A single-slot queue can never free the slot the caller occupies.
            if self.kind.width() == 1 && st.running_threads.contains(&caller) {
                tracing::warn!(target: "taskline", queue = %self.name, "sync submission from own task refused");
                return Err(ScheduleError::DeadlockRisk {
                    queue: self.name.to_string(),
                });
            }
            self.publish_submitted(cell.id(), Schedule::Now, now);

            if !st.paused && st.pending.is_empty() && st.running < self.kind.width() {
                st.running += 1;
                cell.transition(TaskState::Running);
                Some(Dispatch::new(Arc::clone(self), cell, job))
            } else {
                st.pending.push_back(PendingTask {
                    cell,
                    job,
                    schedule: Schedule::Now,
                    submitted: now,
                    deadline: None,
                });
                None
            }
        };

        match direct {
            Some(dispatch) => self.executor.run_and_wait(dispatch.into_job()),
            None => self.pump(),
        }

        match handle.wait() {
            TaskState::Cancelled => Err(self.rejected()),
            _ => Ok(handle),
        }
    }

    // ---------------------------
    // Control
    // ---------------------------

    pub(crate) fn pause(&self) {
        let mut st = self.state.lock();
        if !st.paused {
            st.paused = true;
            self.bus.publish(self.event(EventKind::QueuePaused));
        }
    }

    pub(crate) fn resume(self: &Arc<Self>) {
        {
            let mut st = self.state.lock();
            if !st.paused {
                return;
            }
            st.paused = false;
            self.bus.publish(self.event(EventKind::QueueResumed));
        }
        self.pump();
    }

    /// Cancels every pending task; returns how many were cancelled.
    pub(crate) fn cancel_all(&self) -> usize {
        let mut st = self.state.lock();
        self.cancel_pending(&mut st, "cancel_all")
    }

    /// Cancels one pending task by id.
    pub(crate) fn cancel_id(self: &Arc<Self>, id: TaskId) -> bool {
        {
            let mut st = self.state.lock();
            let Some(pos) = st.pending.iter().position(|t| t.cell.id() == id) else {
                return false;
            };
            let Some(task) = st.pending.remove(pos) else {
                return false;
            };
            task.cell.transition(TaskState::Cancelled);
            self.publish_cancelled(id, "cancel");
        }
        // The new head may already be eligible.
        self.pump();
        true
    }

    /// Cancels pending tasks and rejects further submissions. Idempotent.
    pub(crate) fn release(&self) {
        let mut st = self.state.lock();
        if st.released {
            return;
        }
        st.released = true;
        let cancelled = self.cancel_pending(&mut st, "released");
        tracing::debug!(target: "taskline", queue = %self.name, cancelled, "queue released");
        self.bus.publish(self.event(EventKind::QueueReleased));
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    pub(crate) fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub(crate) fn is_released(&self) -> bool {
        self.state.lock().released
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub(crate) fn running_len(&self) -> usize {
        self.state.lock().running
    }

    /// True if `thread` is currently executing a task of this queue.
    pub(crate) fn is_running_on(&self, thread: ThreadId) -> bool {
        self.state.lock().running_threads.contains(&thread)
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Dequeues every eligible task the free slots allow and hands them to the executor.
    fn pump(self: &Arc<Self>) {
        let mut ready = Vec::new();
        {
            let mut st = self.state.lock();
            let width = self.kind.width();
            let now = Instant::now();

            while !st.paused && !st.released && st.running < width {
                let anchor = st.anchor;
                let Some(head) = st.pending.front_mut() else {
                    break;
                };
                let deadline = match head.deadline {
                    Some(d) => d,
                    None => {
                        let d = head.schedule.deadline(head.submitted, anchor);
                        head.deadline = Some(d);
                        d
                    }
                };
                if deadline > now {
                    self.arm_timer(&mut st, deadline);
                    break;
                }
                let Some(task) = st.pending.pop_front() else {
                    break;
                };
                st.running += 1;
                task.cell.transition(TaskState::Running);
                ready.push(Dispatch::new(Arc::clone(self), task.cell, task.job));
            }
        }

        for dispatch in ready {
            self.executor.run(dispatch.into_job());
        }
    }

    /// Ensures a pump happens no later than `deadline`.
    fn arm_timer(self: &Arc<Self>, st: &mut QueueState, deadline: Instant) {
        if matches!(st.timer, Some(armed) if armed <= deadline) {
            return;
        }
        st.timer = Some(deadline);

        let weak = Arc::downgrade(self);
        self.timers.spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            if let Some(queue) = weak.upgrade() {
                queue.on_timer(deadline);
            }
        });
    }

    fn on_timer(self: &Arc<Self>, deadline: Instant) {
        {
            let mut st = self.state.lock();
            if st.timer == Some(deadline) {
                st.timer = None;
            }
        }
        self.pump();
    }

    /// Runs one dequeued task on the current (executor) thread.
    fn execute(self: &Arc<Self>, cell: TaskCell, job: Job) {
        let me = thread::current().id();
        self.state.lock().running_threads.push(me);
        self.bus.publish(
            self.event(EventKind::TaskStarting)
                .with_task(cell.id().as_u64()),
        );

        let outcome = catch_unwind(AssertUnwindSafe(job));

        {
            let mut st = self.state.lock();
            if let Some(pos) = st.running_threads.iter().position(|t| *t == me) {
                st.running_threads.swap_remove(pos);
            }
            st.running = st.running.saturating_sub(1);
            st.anchor = Some(Instant::now());

            let next = match outcome {
                Ok(()) => {
                    self.bus.publish(
                        self.event(EventKind::TaskCompleted)
                            .with_task(cell.id().as_u64()),
                    );
                    TaskState::Completed
                }
                Err(panic_err) => {
                    let reason = panic_message(panic_err.as_ref());
                    self.bus.publish(
                        self.event(EventKind::TaskFailed)
                            .with_task(cell.id().as_u64())
                            .with_reason(reason.as_str()),
                    );
                    TaskState::Failed(TaskError::Failed { reason })
                }
            };
            cell.transition(next);
        }

        self.pump();
    }

    /// Records a job the executor dropped without running it, then refills the freed slot.
    fn abandon(self: &Arc<Self>, cell: TaskCell) {
        {
            let mut st = self.state.lock();
            st.running = st.running.saturating_sub(1);
            cell.transition(TaskState::Cancelled);
            self.publish_cancelled(cell.id(), "executor_dropped");
        }
        tracing::warn!(target: "taskline", queue = %self.name, task = %cell.id(), "executor dropped a job");
        self.pump();
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn cancel_pending(&self, st: &mut QueueState, reason: &'static str) -> usize {
        let drained: Vec<PendingTask> = st.pending.drain(..).collect();
        for task in &drained {
            task.cell.transition(TaskState::Cancelled);
            self.publish_cancelled(task.cell.id(), reason);
        }
        drained.len()
    }

    fn rejected(&self) -> ScheduleError {
        ScheduleError::SchedulingRejected {
            queue: self.name.to_string(),
        }
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_queue(Arc::clone(&self.name))
    }

    fn publish_submitted(&self, id: TaskId, schedule: Schedule, now: Instant) {
        let mut ev = self.event(EventKind::TaskSubmitted).with_task(id.as_u64());
        if let Some(delay) = schedule.reported_delay(now) {
            ev = ev.with_delay(delay);
        }
        self.bus.publish(ev);
    }

    fn publish_cancelled(&self, id: TaskId, reason: &'static str) {
        self.bus.publish(
            self.event(EventKind::TaskCancelled)
                .with_task(id.as_u64())
                .with_reason(reason),
        );
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        let st = self.state.get_mut();
        for task in st.pending.drain(..) {
            task.cell.transition(TaskState::Cancelled);
        }
    }
}

/// A dequeued task on its way to the executor.
///
/// Dropping it unexecuted (executor refused the job) cancels the task and frees its slot.
struct Dispatch {
    queue: Arc<QueueInner>,
    cell: Option<TaskCell>,
    job: Option<Job>,
}

impl Dispatch {
    fn new(queue: Arc<QueueInner>, cell: TaskCell, job: Job) -> Self {
        Self {
            queue,
            cell: Some(cell),
            job: Some(job),
        }
    }

    fn into_job(self) -> Job {
        Box::new(move || self.execute())
    }

    fn execute(mut self) {
        if let (Some(cell), Some(job)) = (self.cell.take(), self.job.take()) {
            self.queue.execute(cell, job);
        }
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.queue.abandon(cell);
        }
    }
}
