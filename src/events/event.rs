//! # Lifecycle events emitted by tasks.
//!
//! An [`Event`] names its source (a task, or a subscriber for delivery
//! problems) and carries an [`EventKind`] holding whatever data that kind has.
//!
//! ```text
//! Started ─► CancelRequested? ─► Failed? ─► Completed | Cancelled | ShutdownForced
//! ```
//!
//! `seq` grows monotonically across the process. Use it to restore order when
//! events from the background side and the controlling side interleave.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskpump::{Event, EventKind};
//!
//! let ev = Event::new("matrix", EventKind::Cancelled { elapsed: Duration::from_millis(1500) });
//!
//! assert_eq!(&*ev.source, "matrix");
//! assert_eq!(ev.kind.as_label(), "cancelled");
//! assert_eq!(ev.elapsed(), Some(Duration::from_millis(1500)));
//! assert!(ev.is_terminal());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened, with the data that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventKind {
    /// `start` ran `pre_start` and is launching the body.
    Started,
    /// First effective call to [`Task::cancel`](crate::Task::cancel).
    CancelRequested,
    /// The body or `post_process` failed; published from the background side.
    Failed { reason: Arc<str> },
    /// Finish transition took the `on_finished` branch.
    Completed { elapsed: Duration },
    /// Finish transition took the `on_cancelled` branch.
    Cancelled { elapsed: Duration },
    /// Dropped while running: cancelled and waited for, no callbacks.
    ShutdownForced { elapsed: Duration },
    /// A subscriber fell behind the bus and missed `skipped` events.
    SubscriberLagged { skipped: u64 },
    /// A subscriber panicked inside `on_event`.
    SubscriberPanicked { message: Arc<str> },
}

impl EventKind {
    /// Short kebab-case label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::CancelRequested => "cancel-requested",
            EventKind::Failed { .. } => "failed",
            EventKind::Completed { .. } => "completed",
            EventKind::Cancelled { .. } => "cancelled",
            EventKind::ShutdownForced { .. } => "shutdown-forced",
            EventKind::SubscriberLagged { .. } => "subscriber-lagged",
            EventKind::SubscriberPanicked { .. } => "subscriber-panicked",
        }
    }
}

/// One published event.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide sequence number.
    pub seq: u64,
    /// Wall-clock time of creation.
    pub at: SystemTime,
    /// Task name, or subscriber name for `Subscriber*` kinds.
    pub source: Arc<str>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(source: impl Into<Arc<str>>, kind: EventKind) -> Self {
        Self {
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
            source: source.into(),
            kind,
        }
    }

    /// Time from `start` to the end of the task, for terminal kinds.
    pub fn elapsed(&self) -> Option<Duration> {
        match self.kind {
            EventKind::Completed { elapsed }
            | EventKind::Cancelled { elapsed }
            | EventKind::ShutdownForced { elapsed } => Some(elapsed),
            _ => None,
        }
    }

    /// Failure reason or panic message, if the kind carries one.
    pub fn reason(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Failed { reason } => Some(reason),
            EventKind::SubscriberPanicked { message } => Some(message),
            _ => None,
        }
    }

    /// True for events that end a task's life.
    pub fn is_terminal(&self) -> bool {
        self.elapsed().is_some()
    }
}
