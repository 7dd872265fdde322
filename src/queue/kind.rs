/// Execution discipline of a [`TaskQueue`](crate::TaskQueue).
///
/// Both kinds dequeue in submission order; they differ in how many dequeued
/// tasks may run at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueKind {
    /// At most one task runs at a time.
    #[default]
    Serial,
    /// Up to `width` tasks run at a time (`0` is treated as `1`).
    Concurrent {
        /// Maximum number of simultaneously running tasks.
        width: usize,
    },
}

impl QueueKind {
    /// Maximum number of simultaneously running tasks.
    #[inline]
    pub fn width(&self) -> usize {
        match *self {
            QueueKind::Serial => 1,
            QueueKind::Concurrent { width } => width.max(1),
        }
    }

    #[inline]
    pub fn is_serial(&self) -> bool {
        matches!(self, QueueKind::Serial)
    }
}
