//! # taskline
//!
//! **Taskline** is a small task-scheduling and publish/subscribe toolkit.
//!
//! It provides named, ordered execution contexts (task queues) bound to a thread
//! primitive, delayed and absolute-time submission, pause/resume/cancel, and a
//! capability-keyed publisher that broadcasts to weakly held observers either
//! inline or through a queue.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  submit / submit_after / submit_at / submit_sync
//!            │                         ┌────────────────────────┐
//!            ▼                         │ Scheduler              │
//!     ┌──────────────┐                 │  - runtime (tokio)     │
//!     │  TaskQueue   │◄── new_queue ───│  - main  (WorkerThread)│
//!     │  pending FIFO│                 │  - background (pool)   │
//!     │  pause/cancel│                 │  - queue registry      │
//!     └──────┬───────┘                 │  - Bus ─► MonitorSet   │
//!            │ pump(): head eligible?  └────────────────────────┘
//!            ├─ no  ─► timer(deadline) on the runtime
//!            └─ yes ─► Executor::run(job) ─► catch_unwind ─► Completed | Failed
//!
//!  Publisher
//!    capability ─► [observer1, observer2, ...]   (Weak, registration order)
//!      ├─ publisher_for_observers_using::<dyn C>()   ─► Multicast<dyn C>
//!      ├─ publish_to_observers_using::<dyn C>(f)     ─► inline
//!      └─ publish_to_observers_using_queue(q, f)     ─► one task per observer
//! ```
//!
//! ### Task lifecycle
//! ```text
//! Pending ──► Running ──► Completed
//!    │            └─────► Failed(reason)   (panic caught at the execution boundary)
//!    └──► Cancelled                         (cancel / cancel_all / release)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Queues**        | Ordered execution, delays, pause/resume, cancellation.        | [`TaskQueue`], [`QueueKind`], [`TaskHandle`] |
//! | **Runners**       | Delays counted from the call.                                  | [`TaskRunner`]                              |
//! | **Executors**     | Where closures run.                                            | [`Executor`], [`BlockingPool`], [`WorkerThread`] |
//! | **Scheduler**     | Runtime, well-known queues, queue registry.                    | [`Scheduler`], [`SchedulerConfig`]          |
//! | **Publish**       | Capability-keyed observers and broadcast.                      | [`Publisher`], [`Multicast`], [`TypedPublisher`] |
//! | **Monitors**      | Hook into runtime events (logging, metrics).                   | [`Monitor`], [`MonitorSet`]                 |
//! | **Errors**        | Typed errors for scheduling, subscription and tasks.           | [`ScheduleError`], [`SubscribeError`], [`TaskError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] monitor.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskline::{Scheduler, SchedulerConfig, TaskState};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = Scheduler::builder(SchedulerConfig::default()).build()?;
//!     let io = scheduler.new_queue("io");
//!
//!     io.submit_async(|| println!("first"))?;
//!     let later = io.submit_after(|| println!("100ms after first"), Duration::from_millis(100))?;
//!
//!     assert_eq!(later.wait(), TaskState::Completed);
//!     Ok(())
//! }
//! ```

mod error;
mod events;
mod executor;
mod monitors;
mod publish;
mod queue;
mod runner;
mod scheduler;
mod tasks;

// ---- Public re-exports ----

pub use error::{RuntimeError, ScheduleError, SubscribeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use executor::{BlockingPool, Executor, WorkerThread};
pub use monitors::{Monitor, MonitorSet};
pub use publish::{
    CapabilityId, CapabilitySet, KeyList, Multicast, Observer, ObserverId, Publisher,
    Subscription, SubscriptionPolicy, TypedPublisher,
};
pub use queue::{QueueKind, TaskQueue};
pub use runner::TaskRunner;
pub use scheduler::{BACKGROUND_QUEUE, MAIN_QUEUE, Scheduler, SchedulerBuilder, SchedulerConfig};
pub use tasks::{Job, Schedule, SubmitMode, TaskHandle, TaskId, TaskState};

// Optional: expose a simple built-in logger monitor.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use monitors::LogWriter;
