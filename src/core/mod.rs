//! Task lifecycle core.
//!
//! The public API from this module is [`Task`], its [`TaskBuilder`] and
//! [`TaskStatus`].
//!
//! Internal modules:
//! - [`task`]: the state machine (start, pump, await, finish transition, drop);
//! - [`builder`]: assembles a task with its store, callbacks, executor and bus;
//! - [`runner`]: the background closure (skip-if-cancelled, catch, capture);
//! - [`capture`]: outcome type and one-time failure delivery;
//! - [`status`]: lifecycle states.

mod builder;
mod capture;
mod runner;
mod status;
mod task;

pub use builder::TaskBuilder;
pub use status::TaskStatus;
pub use task::Task;
