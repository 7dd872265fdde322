//! Error types used by the taskline runtime, queues and publishers.
//!
//! This module defines four error enums:
//!
//! - [`ScheduleError`] - raised synchronously when a task cannot be scheduled.
//! - [`SubscribeError`] - raised synchronously when a subscription is declined.
//! - [`TaskError`] - recorded on a task whose closure failed while executing.
//! - [`RuntimeError`] - raised while building the scheduler itself.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced when submitting work to a queue.
///
/// These are scheduling-time failures: the task never became Pending (or, for
/// a sync submission, was proven impossible to run).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Sync submission from a task already running on the same single-slot queue.
    ///
    /// Waiting would block the only execution slot the submitted task could use.
    #[error("sync submission to queue {queue:?} from its own running task would deadlock")]
    DeadlockRisk {
        /// Name of the queue the submission targeted.
        queue: String,
    },

    /// The queue was released, or a sync submission was cancelled before it could run.
    #[error("queue {queue:?} rejected the task")]
    SchedulingRejected {
        /// Name of the queue the submission targeted.
        queue: String,
    },
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskline::ScheduleError;
    ///
    /// let err = ScheduleError::DeadlockRisk { queue: "main".into() };
    /// assert_eq!(err.as_label(), "schedule_deadlock_risk");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::DeadlockRisk { .. } => "schedule_deadlock_risk",
            ScheduleError::SchedulingRejected { .. } => "schedule_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScheduleError::DeadlockRisk { queue } => format!("deadlock risk on queue={queue}"),
            ScheduleError::SchedulingRejected { queue } => format!("rejected by queue={queue}"),
        }
    }

    /// Name of the queue the failed submission targeted.
    pub fn queue(&self) -> &str {
        match self {
            ScheduleError::DeadlockRisk { queue } | ScheduleError::SchedulingRejected { queue } => {
                queue
            }
        }
    }
}

/// # Errors produced when registering an observer with a publisher.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// Every capability the observer offered was declined by the `on_subscribe` hook.
    #[error("subscription rejected for capabilities {capabilities:?}")]
    SubscriptionRejected {
        /// Names of the rejected capabilities.
        capabilities: Vec<&'static str>,
    },
}

impl SubscribeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscribeError::SubscriptionRejected { .. } => "subscription_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscribeError::SubscriptionRejected { capabilities } => {
                format!("rejected capabilities={capabilities:?}")
            }
        }
    }
}

/// # Errors produced by task execution.
///
/// A failure is captured at the execution boundary and recorded on the task.
/// It never propagates to the submitter or halts the queue.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The closure panicked while running.
    #[error("task failed: {reason}")]
    Failed {
        /// Panic payload rendered as text.
        reason: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskline::TaskError;
    ///
    /// let err = TaskError::Failed { reason: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Failed { .. } => "task_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Failed { reason } => format!("error: {reason}"),
        }
    }
}

/// # Errors produced while building the scheduler runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The tokio runtime or a worker thread could not be started.
    #[error("failed to start scheduler runtime: {reason}")]
    RuntimeBuild {
        /// Underlying I/O error message.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::RuntimeBuild { .. } => "runtime_build_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::RuntimeBuild { reason } => format!("runtime build failed: {reason}"),
        }
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::RuntimeBuild {
            reason: err.to_string(),
        }
    }
}

/// Renders a `catch_unwind` payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let deadlock = ScheduleError::DeadlockRisk { queue: "q".into() };
        let rejected = ScheduleError::SchedulingRejected { queue: "q".into() };
        assert_eq!(deadlock.as_label(), "schedule_deadlock_risk");
        assert_eq!(rejected.as_label(), "schedule_rejected");
        assert_eq!(deadlock.queue(), "q");

        let sub = SubscribeError::SubscriptionRejected {
            capabilities: vec!["dyn Ping"],
        };
        assert_eq!(sub.as_label(), "subscription_rejected");
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(s.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }

    #[test]
    fn test_io_error_converts_to_runtime_build() {
        let io = std::io::Error::other("no threads");
        let err: RuntimeError = io.into();
        assert_eq!(err.as_label(), "runtime_build_failed");
        assert!(err.as_message().contains("no threads"));
    }
}
