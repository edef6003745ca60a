//! # Where the background side runs.
//!
//! [`Execute`] launches one boxed job per task. The task owns the job's outcome
//! channel, so an executor only has to run the closure to completion somewhere
//! else; it never reports results itself.
//!
//! | Executor            | Runs the job on                                   |
//! |---------------------|---------------------------------------------------|
//! | [`ThreadExecutor`]  | a fresh, named OS thread (default)                |
//! | [`TokioExecutor`]   | the blocking pool of a tokio runtime              |

mod blocking;
mod thread;

pub use blocking::TokioExecutor;
pub use thread::ThreadExecutor;

/// One background job: runs the body and sends its outcome.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Launches background jobs.
///
/// `execute` must either run `job` exactly once on another thread, or return
/// `Err` without running it (the job is dropped).
pub trait Execute: Send + Sync + 'static {
    /// Launches `job`. `name` is the task name, for thread naming or tracing.
    fn execute(&self, name: &str, job: Job) -> std::io::Result<()>;
}
