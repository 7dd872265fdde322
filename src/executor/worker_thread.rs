//! # Single dedicated worker thread
//!
//! [`WorkerThread`] owns one OS thread that drains an unbounded job channel in order.
//! The main queue is bound to one, so all of its tasks run on the same thread.
//!
//! ## Rules
//! - Jobs run strictly one after another, in the order `run` was called.
//! - Dropping the last `WorkerThread` closes the channel; the thread finishes the jobs
//!   already sent and exits.
//! - A panicking job does not kill the thread.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, ThreadId};

use tokio::sync::mpsc;

use crate::executor::Executor;
use crate::tasks::Job;

/// [`Executor`] backed by a single named OS thread.
pub struct WorkerThread {
    name: String,
    thread: ThreadId,
    tx: mpsc::UnboundedSender<Job>,
}

impl WorkerThread {
    /// Spawns the worker thread.
    ///
    /// Fails only if the OS refuses to create the thread.
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let join = thread::Builder::new().name(name.clone()).spawn(move || {
            while let Some(job) = rx.blocking_recv() {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::warn!(target: "taskline", "job panicked on worker thread");
                }
            }
        })?;

        Ok(Self {
            name,
            thread: join.thread().id(),
            tx,
        })
    }

    /// Name given to the OS thread.
    pub fn thread_name(&self) -> &str {
        &self.name
    }

    /// Id of the OS thread (for "am I on the worker?" checks).
    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }
}

impl Executor for WorkerThread {
    fn run(&self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::warn!(target: "taskline", thread = %self.name, "worker thread gone; job dropped");
        }
    }

    fn name(&self) -> &'static str {
        "worker-thread"
    }
}

impl std::fmt::Debug for WorkerThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerThread")
            .field("name", &self.name)
            .field("thread", &self.thread)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_jobs_run_in_order_on_one_thread() {
        let worker = WorkerThread::spawn("test-worker").expect("spawn");
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = seen.clone();
            worker.run(Box::new(move || {
                seen.lock().push((i, thread::current().id()));
            }));
        }
        worker.run_and_wait(Box::new(|| {}));

        let seen = seen.lock();
        let order: Vec<i32> = seen.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert!(seen.iter().all(|(_, t)| *t == worker.thread_id()));
    }

    #[test]
    fn test_panicking_job_keeps_thread_alive() {
        let worker = WorkerThread::spawn("test-worker-panic").expect("spawn");
        worker.run(Box::new(|| panic!("boom")));

        let ran = Arc::new(Mutex::new(false));
        let r = ran.clone();
        worker.run_and_wait(Box::new(move || *r.lock() = true));
        assert!(*ran.lock());
    }
}
