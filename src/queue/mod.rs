//! # Task queues: ordering, delays, pause/resume and cancellation.
//!
//! - [`TaskQueue`] - public handle of one named queue
//! - [`QueueKind`] - serial or bounded-concurrent discipline
//!
//! The engine behind a queue (pending sequence, dispatch, timers) is crate-private.

mod inner;
mod kind;
mod task_queue;

pub(crate) use inner::QueueInner;
pub use kind::QueueKind;
pub use task_queue::TaskQueue;
