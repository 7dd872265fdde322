//! # Executors: where queued closures actually run.
//!
//! - [`Executor`] - the contract a queue is bound to (`run`, `run_and_wait`)
//! - [`BlockingPool`] - tokio blocking thread pool (`spawn_blocking`)
//! - [`WorkerThread`] - one dedicated OS thread

mod blocking_pool;
#[allow(clippy::module_inception)]
mod executor;
mod worker_thread;

pub use blocking_pool::BlockingPool;
pub use executor::Executor;
pub use worker_thread::WorkerThread;
