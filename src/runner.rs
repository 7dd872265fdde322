//! # Task runner: delayed scheduling on a wrapped queue.
//!
//! [`TaskRunner`] is a thin façade over a [`TaskQueue`]. Its delays count from the
//! moment of the call, unlike [`TaskQueue::submit_after`], whose delay counts from the
//! completion of the previous task.
//!
//! ```text
//! schedule_after(f, d)      ─► queue.submit_at(f, now + d)
//! schedule_at(f, instant)   ─► queue.submit_at(f, instant)
//! schedule_at_system(f, t)  ─► queue.submit_at(f, now + (t - wall_now))
//! ```

use std::time::{Duration, Instant, SystemTime};

use crate::error::ScheduleError;
use crate::queue::TaskQueue;
use crate::tasks::TaskHandle;

/// Schedules closures on one queue relative to the current time.
#[derive(Clone, Debug)]
pub struct TaskRunner {
    queue: TaskQueue,
}

impl TaskRunner {
    /// Wraps `queue`.
    pub fn new(queue: TaskQueue) -> Self {
        Self { queue }
    }

    /// The wrapped queue.
    #[inline]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Submits `f` to start no earlier than `delay` from now.
    ///
    /// A zero delay behaves like [`TaskQueue::submit_async`].
    pub fn schedule_after<F>(&self, f: F, delay: Duration) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        let now = Instant::now();
        let at = now.checked_add(delay).unwrap_or(now);
        self.queue.submit_at(f, at)
    }

    /// Submits `f` to start no earlier than `at`.
    pub fn schedule_at<F>(&self, f: F, at: Instant) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.submit_at(f, at)
    }

    /// Submits `f` to start at the wall-clock time `at`.
    ///
    /// The wall-clock time is converted once, at the call; later clock adjustments
    /// do not move the deadline. A time in the past means "now".
    pub fn schedule_at_system<F>(&self, f: F, at: SystemTime) -> Result<TaskHandle, ScheduleError>
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = at.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO);
        self.schedule_after(f, delay)
    }
}
