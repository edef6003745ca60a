//! # Background-side view of a task.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Handle passed to [`Work::run`](crate::Work::run).
///
/// Cloneable and `Send`, so a body may hand it to helper threads it spawns itself.
pub struct Context<P> {
    token: CancellationToken,
    sink: Arc<dyn Fn(P) + Send + Sync>,
}

impl<P> Clone for Context<P> {
    fn clone(&self) -> Self {
        Self {
            token: self.token.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<P> fmt::Debug for Context<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<P: 'static> Context<P> {
    /// Creates a context that forwards published values to `sink`.
    pub fn new(token: CancellationToken, sink: impl Fn(P) + Send + Sync + 'static) -> Self {
        Self {
            token,
            sink: Arc::new(sink),
        }
    }

    /// Context that is never cancelled (unless via [`token`](Self::token)) and
    /// discards progress. Useful for calling a body directly.
    pub fn detached() -> Self {
        Self::new(CancellationToken::new(), |_| {})
    }

    /// True once cancellation was requested. Never flips back.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Publishes a progress value.
    ///
    /// Dropped silently when cancellation is already in effect.
    pub fn publish_progress(&self, value: P) {
        if self.token.is_cancelled() {
            return;
        }
        (self.sink)(value);
    }

    /// Cancellation token shared with the controlling side.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
