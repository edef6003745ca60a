//! # Deferred failure delivery.
//!
//! The background side never raises: it returns an [`Outcome`] whose `failure`
//! is set when the body failed. The controlling side arms an [`ErrorCapture`]
//! with it at the finish transition and takes it exactly once.

use crate::error::TaskError;

/// What the background side sends back: a value, plus a failure if one was captured.
///
/// On failure `value` is `O::default()`.
#[derive(Debug)]
pub(crate) struct Outcome<O, E> {
    pub(crate) value: O,
    pub(crate) failure: Option<TaskError<E>>,
}

impl<O, E> Outcome<O, E> {
    pub(crate) fn ok(value: O) -> Self {
        Self {
            value,
            failure: None,
        }
    }
}

impl<O: Default, E> Outcome<O, E> {
    pub(crate) fn failed(err: TaskError<E>) -> Self {
        Self {
            value: O::default(),
            failure: Some(err),
        }
    }
}

/// Zero-or-one failure plus a delivery flag.
#[derive(Debug)]
pub(crate) struct ErrorCapture<E> {
    pending: Option<TaskError<E>>,
    delivered: bool,
}

impl<E> Default for ErrorCapture<E> {
    fn default() -> Self {
        Self {
            pending: None,
            delivered: false,
        }
    }
}

impl<E> ErrorCapture<E> {
    /// Stores `failure` unless one was already armed or delivered (first wins).
    pub(crate) fn arm(&mut self, failure: Option<TaskError<E>>) {
        if self.pending.is_none() && !self.delivered {
            self.pending = failure;
        }
    }

    /// Hands out the failure once; every later call returns `None`.
    pub(crate) fn take(&mut self) -> Option<TaskError<E>> {
        let failure = self.pending.take();
        if failure.is_some() {
            self.delivered = true;
        }
        failure
    }
}
