use tokio::runtime::Handle;

use crate::executor::Executor;
use crate::tasks::Job;

/// [`Executor`] that runs jobs on a tokio runtime's blocking thread pool.
///
/// Used by the background queue and by every queue created through
/// [`Scheduler::new_queue`](crate::Scheduler::new_queue).
#[derive(Clone, Debug)]
pub struct BlockingPool {
    handle: Handle,
}

impl BlockingPool {
    /// Creates a new executor using the provided tokio runtime handle.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Returns the internal tokio runtime handle.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Executor for BlockingPool {
    fn run(&self, job: Job) {
        // After runtime shutdown the closure is dropped unrun; queues handle that.
        let _ = self.handle.spawn_blocking(job);
    }

    fn name(&self) -> &'static str {
        "blocking-pool"
    }
}
