//! # Task bodies.
//!
//! A task body is split along the thread boundary it runs on:
//! - [`Work`]: the background half (`run`, `post_process`, `should_merge`)
//! - [`Callbacks`]: the controlling half (`pre_start`, `on_progress`, `on_finished`, `on_cancelled`)
//! - [`Context`]: what `run` sees (cancellation check and progress publishing)
//! - [`WorkFn`]: closure-backed [`Work`] for small bodies

mod callbacks;
mod context;
mod work;
mod work_fn;

pub use callbacks::Callbacks;
pub use context::Context;
pub use work::Work;
pub use work_fn::WorkFn;
