//! # Task identity, state and handles.
//!
//! This module provides the task-related types:
//! - [`TaskId`], [`TaskState`] - identity and lifecycle of one unit of work
//! - [`TaskHandle`] - caller-side handle for observing and cancelling a task
//! - [`Schedule`], [`SubmitMode`] - when a task becomes eligible and how submission returns
//! - [`Job`] - the zero-argument closure type consumed by queues and executors

mod handle;
mod schedule;
mod task;

pub use handle::TaskHandle;
pub use schedule::{Schedule, SubmitMode};
pub(crate) use task::TaskCell;
pub use task::{TaskId, TaskState};

/// A zero-argument unit of work, opaque to the scheduler.
pub type Job = Box<dyn FnOnce() + Send + 'static>;
