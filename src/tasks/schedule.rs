//! # When a submitted task becomes eligible to start.
//!
//! A [`Schedule`] is attached to every pending task:
//! - [`Schedule::Now`] - eligible as soon as it reaches the head of its queue;
//! - [`Schedule::After`] - eligible `delay` after the later of its submission and the
//!   completion of the previous task on the queue;
//! - [`Schedule::At`] - eligible at an absolute monotonic instant.
//!
//! ## Rules
//! - `After(Duration::ZERO)` and `At(past)` are immediately eligible.
//! - The deadline of an `After` task is fixed the first time the queue considers it
//!   for dequeue and never moves afterwards.

use std::time::{Duration, Instant};

/// Scheduling time of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// No delay.
    #[default]
    Now,
    /// Relative delay measured on the queue's logical clock.
    After(Duration),
    /// Absolute monotonic deadline.
    At(Instant),
}

impl Schedule {
    /// Resolves the deadline, given the queue's completion anchor.
    ///
    /// `submitted` is the submission instant of the task, `anchor` the completion
    /// instant of the most recent task on the queue (if any).
    pub(crate) fn deadline(&self, submitted: Instant, anchor: Option<Instant>) -> Instant {
        match *self {
            Schedule::Now => submitted,
            Schedule::After(delay) => {
                let base = match anchor {
                    Some(a) if a > submitted => a,
                    _ => submitted,
                };
                base.checked_add(delay).unwrap_or(base)
            }
            Schedule::At(at) => at,
        }
    }

    /// Delay to report in events (`None` for [`Schedule::Now`]).
    pub(crate) fn reported_delay(&self, now: Instant) -> Option<Duration> {
        match *self {
            Schedule::Now => None,
            Schedule::After(d) => Some(d),
            Schedule::At(at) => Some(at.saturating_duration_since(now)),
        }
    }
}

/// How [`TaskQueue::submit`](crate::TaskQueue::submit) returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// Return as soon as the task is Pending.
    #[default]
    Async,
    /// Block the calling thread until the task finishes.
    Sync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_submission_time() {
        let t = Instant::now();
        assert_eq!(Schedule::Now.deadline(t, None), t);
    }

    #[test]
    fn test_after_counts_from_later_anchor() {
        let submitted = Instant::now();
        let anchor = submitted + Duration::from_millis(50);
        let d = Duration::from_millis(100);

        assert_eq!(Schedule::After(d).deadline(submitted, None), submitted + d);
        assert_eq!(
            Schedule::After(d).deadline(submitted, Some(anchor)),
            anchor + d
        );
        // Anchor older than the submission does not pull the deadline back.
        let stale = submitted.checked_sub(Duration::from_millis(10)).unwrap_or(submitted);
        assert_eq!(Schedule::After(d).deadline(submitted, Some(stale)), submitted + d);
    }

    #[test]
    fn test_zero_delay_is_immediate() {
        let t = Instant::now();
        assert_eq!(Schedule::After(Duration::ZERO).deadline(t, None), t);
    }

    #[test]
    fn test_reported_delay_for_past_deadline_is_zero() {
        let now = Instant::now();
        let past = now.checked_sub(Duration::from_secs(1)).unwrap_or(now);
        assert_eq!(Schedule::At(past).reported_delay(now), Some(Duration::ZERO));
        assert_eq!(Schedule::Now.reported_delay(now), None);
    }
}
