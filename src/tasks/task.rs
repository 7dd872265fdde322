//! # Task identity and lifecycle state.
//!
//! Every closure accepted by a [`TaskQueue`](crate::TaskQueue) becomes a task with a
//! process-unique [`TaskId`] and a [`TaskState`] published through a `watch` channel.
//!
//! ## Lifecycle
//! ```text
//! Pending ──► Running ──► Completed
//!    │            └─────► Failed(TaskError)
//!    └──► Cancelled   (cancel / cancel_all / release, only while Pending)
//! ```
//!
//! ## Rules
//! - Transitions only move forward; a terminal state is never left.
//! - `Cancelled` is reachable only from `Pending`; a Running task always finishes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use tokio::sync::watch;

use crate::error::TaskError;

/// Global counter for task ids.
static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique task identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> Self {
        Self(TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric id (as carried in [`Event::task`](crate::Event::task)).
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting in its queue's pending sequence.
    Pending,
    /// Handed to the executor; the closure is (about to be) running.
    Running,
    /// Closure returned normally.
    Completed,
    /// Removed before it started.
    Cancelled,
    /// Closure panicked; carries the captured failure.
    Failed(TaskError),
}

impl TaskState {
    /// True once the task can no longer change state.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed(_)
        )
    }

    /// True if the closure actually ran (successfully or not).
    #[inline]
    pub fn has_run(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed(_))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Cancelled => "cancelled",
            TaskState::Failed(_) => "failed",
        }
    }
}

/// Shared state cell of one task; the queue holds the writing side.
pub(crate) struct TaskCell {
    id: TaskId,
    state: watch::Sender<TaskState>,
}

impl TaskCell {
    pub(crate) fn new() -> Self {
        let (state, _rx) = watch::channel(TaskState::Pending);
        Self {
            id: TaskId::next(),
            state,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn watch(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Applies `next` unless the task is already terminal.
    ///
    /// Returns `true` if the state changed.
    pub(crate) fn transition(&self, next: TaskState) -> bool {
        self.state.send_if_modified(|cur| {
            if cur.is_terminal() {
                return false;
            }
            *cur = next;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = TaskCell::new();
        let b = TaskCell::new();
        assert!(b.id() > a.id());
        assert_eq!(format!("{}", a.id()), format!("task-{}", a.id().as_u64()));
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let cell = TaskCell::new();
        assert!(cell.transition(TaskState::Running));
        assert!(cell.transition(TaskState::Completed));
        assert!(!cell.transition(TaskState::Cancelled));
        assert_eq!(cell.state(), TaskState::Completed);
    }

    #[test]
    fn test_watchers_observe_transitions() {
        let cell = TaskCell::new();
        let rx = cell.watch();
        cell.transition(TaskState::Failed(TaskError::Failed {
            reason: "boom".into(),
        }));
        assert_eq!(rx.borrow().as_label(), "failed");
        assert!(rx.borrow().has_run());
    }
}
