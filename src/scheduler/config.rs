//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`], the settings used by
//! [`SchedulerBuilder::build`](crate::SchedulerBuilder::build).
//!
//! ## Sentinel values
//! - `worker_threads = 0` → tokio default (one per core)
//! - `max_blocking_threads = 0` → tokio default
//! - `background_width = 0` → available parallelism

use std::num::NonZeroUsize;

/// Configuration of a [`Scheduler`](crate::Scheduler).
///
/// ## Field semantics
/// - `worker_threads`: async worker threads of the owned runtime (drives timers and monitors)
/// - `max_blocking_threads`: upper bound of the blocking pool that runs background tasks
/// - `background_width`: concurrent tasks allowed on the background queue
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `thread_name`: name prefix of the runtime's threads
///
/// `worker_threads` and `max_blocking_threads` are ignored when the scheduler is
/// built on an existing runtime handle.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Number of async worker threads (`0` = tokio default).
    pub worker_threads: usize,

    /// Maximum number of blocking-pool threads (`0` = tokio default).
    pub max_blocking_threads: usize,

    /// Width of the background queue (`0` = available parallelism).
    pub background_width: usize,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow receivers lagging behind more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,

    /// Thread name prefix for the owned runtime.
    pub thread_name: String,
}

impl SchedulerConfig {
    #[inline]
    pub fn worker_threads(&self) -> Option<usize> {
        if self.worker_threads == 0 {
            None
        } else {
            Some(self.worker_threads)
        }
    }

    #[inline]
    pub fn max_blocking_threads(&self) -> Option<usize> {
        if self.max_blocking_threads == 0 {
            None
        } else {
            Some(self.max_blocking_threads)
        }
    }

    /// Resolved background queue width (never 0).
    pub fn background_width_resolved(&self) -> usize {
        if self.background_width > 0 {
            return self.background_width;
        }
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `worker_threads = 0` (tokio default)
    /// - `max_blocking_threads = 0` (tokio default)
    /// - `background_width = 0` (available parallelism)
    /// - `bus_capacity = 1024`
    /// - `thread_name = "taskline"`
    fn default() -> Self {
        Self {
            worker_threads: 0,
            max_blocking_threads: 0,
            background_width: 0,
            bus_capacity: 1024,
            thread_name: "taskline".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_resolve_to_none() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.worker_threads(), None);
        assert_eq!(cfg.max_blocking_threads(), None);
        assert!(cfg.background_width_resolved() >= 1);
    }

    #[test]
    fn test_explicit_values_are_kept() {
        let cfg = SchedulerConfig {
            worker_threads: 2,
            max_blocking_threads: 8,
            background_width: 3,
            bus_capacity: 0,
            ..SchedulerConfig::default()
        };
        assert_eq!(cfg.worker_threads(), Some(2));
        assert_eq!(cfg.max_blocking_threads(), Some(8));
        assert_eq!(cfg.background_width_resolved(), 3);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
