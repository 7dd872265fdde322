//! # Event monitors for the taskline runtime.
//!
//! This module provides the [`Monitor`] trait, the [`MonitorSet`] fan-out and
//! built-in implementations for handling runtime events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   TaskQueue / Publisher ── publish(Event) ──► Bus ──► monitor_listener (Scheduler)
//!                                                            │
//!                                                            ▼
//!                                                       MonitorSet::emit
//!                                                  ┌─────────┼─────────┐
//!                                                  ▼         ▼         ▼
//!                                              LogWriter  Metrics   Custom
//! ```

mod monitor;
mod set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use monitor::Monitor;
pub use set::MonitorSet;
