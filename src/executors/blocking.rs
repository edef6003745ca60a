use tokio::runtime::Handle;

use super::{Execute, Job};

/// Runs jobs on a tokio runtime's blocking pool (`spawn_blocking`).
///
/// The controlling side still drives the task synchronously; use
/// [`Task::join`](crate::Task::join) to await the result from async code
/// instead of `await_result`.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Uses the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running in, if any.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Execute for TokioExecutor {
    fn execute(&self, _name: &str, job: Job) -> std::io::Result<()> {
        // The join handle is not needed; the outcome travels over the task's channel.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}
