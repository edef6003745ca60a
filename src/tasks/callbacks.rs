//! # Controlling-side hooks.
//!
//! [`Callbacks`] run on whichever thread drives the task (`start`, `pump`,
//! `await_result`). They are never called from the background side, so
//! implementations may hold `!Sync` UI state behind `&mut self`.

/// Lifecycle hooks invoked on the controlling side.
///
/// All methods default to no-ops; `()` is the empty implementation.
///
/// Call order for one task:
/// ```text
/// pre_start ─► on_progress* ─► (on_finished | on_cancelled)
/// ```
/// Neither terminal hook runs when the task is dropped while still running.
pub trait Callbacks<P, R> {
    /// Runs inside `start`, before the body is launched.
    fn pre_start(&mut self) {}

    /// Receives drained progress values during `pump` and the finish transition.
    ///
    /// Overwrite stores hand over their current slot on every `pump`, so the same
    /// value may arrive on consecutive ticks. The finish transition only delivers
    /// values no earlier `pump` has seen.
    fn on_progress(&mut self, _progress: &P) {}

    /// Runs once when the task finished without a cancellation request.
    fn on_finished(&mut self, _result: &R) {}

    /// Runs once when the task finished with cancellation in effect.
    fn on_cancelled(&mut self, _result: &R) {}
}

impl<P, R> Callbacks<P, R> for () {}
