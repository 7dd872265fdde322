//! # Example: queues
//!
//! Demonstrates serial and concurrent queues, delays, pause/resume and cancellation.
//!
//! Shows how to:
//! - Build a [`Scheduler`] with the built-in [`LogWriter`] monitor.
//! - Pace work with [`TaskQueue::submit_after`] (delay counted from the previous task).
//! - Schedule relative to *now* with a [`TaskRunner`].
//! - Cancel a pending task through its [`TaskHandle`].
//!
//! ## Flow
//! ```text
//! Scheduler::builder(cfg).with_monitors([LogWriter]).build()
//!     ├─► new_queue("io")     : A ─► (250ms) B ─► C(cancelled) ─► D
//!     ├─► background_runner() : tick after 100ms
//!     └─► Bus ─► MonitorSet ─► LogWriter ─► tracing (RUST_LOG=taskline=debug)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskline=debug cargo run --example queues --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskline::{LogWriter, Monitor, Scheduler, SchedulerConfig, TaskState};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let monitors: Vec<Arc<dyn Monitor>> = vec![Arc::new(LogWriter::new())];
    let scheduler = Scheduler::builder(SchedulerConfig::default())
        .with_monitors(monitors)
        .build()?;

    let io = scheduler.new_queue("io");
    io.pause();

    io.submit_async(|| println!("[io] A"))?;
    io.submit_after(|| println!("[io] B, 250ms after A"), Duration::from_millis(250))?;
    let c = io.submit_async(|| println!("[io] C, never printed"))?;
    let d = io.submit_async(|| println!("[io] D"))?;

    c.cancel();
    io.resume();

    let tick = scheduler
        .background_runner()
        .schedule_after(|| println!("[bg] tick after 100ms"), Duration::from_millis(100))?;

    println!("tick: {}", tick.wait().as_label());
    println!("C: {}", c.wait().as_label());
    assert_eq!(d.wait(), TaskState::Completed);

    let failing = scheduler.background_queue().submit_async(|| panic!("boom"))?;
    failing.wait();
    if let Some(err) = failing.error() {
        println!("background task failed: {}", err.as_message());
    }

    println!("queues: {:?}", scheduler.queue_names());
    Ok(())
}
