//! # Scheduler context: runtime, well-known queues and queue registry.
//!
//! - [`Scheduler`] - owns the runtime, the `main`/`background` queues and created queues
//! - [`SchedulerBuilder`] - wires monitors and an optional external runtime
//! - [`SchedulerConfig`] - runtime sizing and bus capacity

mod builder;
mod config;
#[allow(clippy::module_inception)]
mod scheduler;

pub use builder::{BACKGROUND_QUEUE, MAIN_QUEUE, SchedulerBuilder};
pub use config::SchedulerConfig;
pub use scheduler::Scheduler;
