//! # Caller-side view of a submitted task.
//!
//! A [`TaskHandle`] is returned by every submission. It holds a **weak** reference to the
//! queue (it never keeps a released queue alive) and a `watch` receiver for the task state.
//!
//! ## What a handle can do
//! - observe the state ([`TaskHandle::state`], [`TaskHandle::error`]);
//! - wait for a terminal state ([`TaskHandle::finished`] async, [`TaskHandle::wait`] blocking);
//! - cancel the task while it is still Pending ([`TaskHandle::cancel`]).
//!
//! A handle can never re-submit its task.

use std::sync::{Arc, Weak};

use tokio::sync::watch;

use crate::error::TaskError;
use crate::queue::QueueInner;
use crate::tasks::task::{TaskCell, TaskId, TaskState};

/// Handle to one submitted task.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    queue_name: Arc<str>,
    queue: Weak<QueueInner>,
    state: watch::Receiver<TaskState>,
}

impl TaskHandle {
    pub(crate) fn new(cell: &TaskCell, queue: &Arc<QueueInner>) -> Self {
        Self {
            id: cell.id(),
            queue_name: queue.name_arc(),
            queue: Arc::downgrade(queue),
            state: cell.watch(),
        }
    }

    /// Task identity.
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name of the queue the task was submitted to.
    #[inline]
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Current state snapshot.
    pub fn state(&self) -> TaskState {
        self.state.borrow().clone()
    }

    /// Captured failure, if the task ended `Failed`.
    pub fn error(&self) -> Option<TaskError> {
        match &*self.state.borrow() {
            TaskState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// True once the task reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state.borrow().is_terminal()
    }

    /// Cancels the task if it is still Pending.
    ///
    /// Returns `false` if it already started, finished, was cancelled, or the queue is gone.
    pub fn cancel(&self) -> bool {
        match self.queue.upgrade() {
            Some(queue) => queue.cancel_id(self.id),
            None => false,
        }
    }

    /// True if this handle belongs to `queue`.
    pub(crate) fn belongs_to(&self, queue: &Arc<QueueInner>) -> bool {
        std::ptr::eq(self.queue.as_ptr(), Arc::as_ptr(queue))
    }

    /// Waits until the task reaches a terminal state and returns it.
    ///
    /// A task whose queue was dropped before it ran resolves to `Cancelled`.
    pub async fn finished(&self) -> TaskState {
        let mut rx = self.state.clone();
        if let Ok(state) = rx.wait_for(TaskState::is_terminal).await {
            return state.clone();
        }
        let last = rx.borrow().clone();
        if last.is_terminal() {
            last
        } else {
            TaskState::Cancelled
        }
    }

    /// Blocking variant of [`finished`](Self::finished).
    ///
    /// Must not be called from inside an async context.
    pub fn wait(&self) -> TaskState {
        futures::executor::block_on(self.finished())
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("queue", &self.queue_name)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
