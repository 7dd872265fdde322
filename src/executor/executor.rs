//! # Executor contract
//!
//! An [`Executor`] is the thread primitive a [`TaskQueue`](crate::TaskQueue) is bound to
//! at construction. The queue decides **what** runs and **when**; the executor only
//! decides **where**.
//!
//! ## Contract
//! - [`Executor::run`] is fire-and-forget: it must return without waiting for the job.
//! - [`Executor::run_and_wait`] blocks the caller until the job has returned (or unwound).
//! - An executor may drop a job it cannot run (e.g. runtime shut down); the queue
//!   treats a dropped job as cancelled.

use tokio::sync::oneshot;

use crate::tasks::Job;

/// Thread primitive that actually runs queued closures.
pub trait Executor: Send + Sync + 'static {
    /// Runs `job` somewhere, without waiting for it.
    fn run(&self, job: Job);

    /// Runs `job` and blocks the calling thread until it has finished.
    ///
    /// The default implementation wraps [`run`](Self::run) with a completion signal.
    /// Must not be called from inside an async context.
    fn run_and_wait(&self, job: Job) {
        let (done_tx, done_rx) = oneshot::channel::<()>();
        self.run(Box::new(move || {
            job();
            let _ = done_tx.send(());
        }));
        // Err means the job was dropped or unwound; either way it is over.
        let _ = futures::executor::block_on(done_rx);
    }

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
