//! # Background half of a task body.
//!
//! A [`Work`] describes what runs off the controlling thread: the computation
//! itself, an optional post-processing step, and the merge rule for queued
//! progress. It receives a [`Context`] and should check
//! [`Context::is_cancelled`] regularly to stop cooperatively.

use crate::tasks::Context;

/// # Background, cancellable unit of work.
///
/// `run` and `post_process` execute on the background side; `should_merge` is
/// called from there too, whenever a value is published to a queued store.
///
/// Returning `Err` (or panicking) marks the task as failed: the failure is
/// captured, cancellation is requested, and the error surfaces once on the
/// controlling side at the finish transition.
///
/// # Example
/// ```
/// use taskpump::{Context, Work};
///
/// struct Countdown;
///
/// impl Work for Countdown {
///     type Params = u32;
///     type Progress = u32;
///     type Output = u32;
///     type Error = std::convert::Infallible;
///
///     fn run(&self, from: u32, ctx: &Context<u32>) -> Result<u32, Self::Error> {
///         let mut left = from;
///         while left > 0 && !ctx.is_cancelled() {
///             left -= 1;
///             ctx.publish_progress(left);
///         }
///         Ok(left)
///     }
/// }
///
/// assert_eq!(Countdown.run(3, &Context::detached()), Ok(0));
/// ```
pub trait Work: Send + Sync + 'static {
    /// Input handed over by `start`.
    type Params: Send + 'static;
    /// Published progress values.
    type Progress: Send + 'static;
    /// Final value; `Default` is the result of a task cancelled before its body ran.
    type Output: Default + Clone + Send + 'static;
    /// Failure type carried back to the controlling side.
    type Error: Send + 'static;

    /// Human-readable name (used for thread names and events).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Computes the output. Should poll `ctx.is_cancelled()` and return early.
    fn run(
        &self,
        params: Self::Params,
        ctx: &Context<Self::Progress>,
    ) -> Result<Self::Output, Self::Error>;

    /// Runs on the background side right after a successful `run`.
    fn post_process(&self, output: Self::Output) -> Result<Self::Output, Self::Error> {
        Ok(output)
    }

    /// For queued progress: true if `next` should replace `last` instead of being appended.
    fn should_merge(&self, _last: &Self::Progress, _next: &Self::Progress) -> bool {
        false
    }
}
