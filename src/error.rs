//! Error types used by the task lifecycle.
//!
//! This module defines two enums:
//!
//! - [`StateError`]: usage errors, a lifecycle call made out of order.
//! - [`TaskError`]: everything `pump`/`await_result` can surface, including
//!   the body's own failure carried across from the background side.
//!
//! Both types provide `as_label` for logs/metrics.

use thiserror::Error;

/// # Lifecycle calls made out of order.
///
/// Raised synchronously by [`Task::start`](crate::Task::start) (and
/// `NotStarted` by [`Task::await_result`](crate::Task::await_result)); never
/// queued or deferred.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// `start` was called while the task is running.
    #[error("task is already running")]
    AlreadyRunning,

    /// `start` was called after the task finished; a task runs exactly once.
    #[error("task is already finished")]
    AlreadyFinished,

    /// A result was requested before `start`.
    #[error("task has not been started")]
    NotStarted,
}

impl StateError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpump::StateError;
    ///
    /// assert_eq!(StateError::AlreadyRunning.as_label(), "task_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StateError::AlreadyRunning => "task_already_running",
            StateError::AlreadyFinished => "task_already_finished",
            StateError::NotStarted => "task_not_started",
        }
    }
}

/// # Errors surfaced on the controlling side.
///
/// Body failures are captured on the background side and re-raised by whichever
/// of `pump`/`await_result`/`join` performs the finish transition. They are
/// delivered once; later calls return the (default) result instead.
///
/// `E` is the task's own [`Work::Error`](crate::Work::Error), preserved as-is.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError<E> {
    /// Lifecycle call made out of order.
    #[error(transparent)]
    State(#[from] StateError),

    /// `run` or `post_process` returned an error.
    #[error("task body failed: {0}")]
    Failed(E),

    /// `run` or `post_process` panicked.
    #[error("task body panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
    },

    /// The executor refused to launch the background job.
    #[error("failed to launch background job: {reason}")]
    Launch {
        /// Reason reported by the executor.
        reason: String,
    },

    /// The background job went away without producing an outcome.
    #[error("background job ended without an outcome")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpump::TaskError;
    ///
    /// let err: TaskError<std::io::Error> = TaskError::Abandoned;
    /// assert_eq!(err.as_label(), "task_abandoned");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::State(e) => e.as_label(),
            TaskError::Failed(_) => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Launch { .. } => "task_launch_failed",
            TaskError::Abandoned => "task_abandoned",
        }
    }

    /// Returns the body's own error, if that is what this is.
    pub fn into_failure(self) -> Option<E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// True for failures that came from the background side (not usage errors).
    pub fn is_background(&self) -> bool {
        !matches!(self, TaskError::State(_))
    }
}

impl<E: std::fmt::Display> TaskError<E> {
    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::State(e) => e.to_string(),
            TaskError::Failed(e) => format!("error: {e}"),
            TaskError::Panicked { message } => format!("panic: {message}"),
            TaskError::Launch { reason } => format!("launch: {reason}"),
            TaskError::Abandoned => "abandoned".to_string(),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|msg| (*msg).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
