//! # taskpump
//!
//! **Taskpump** runs one cancellable unit of work on a background thread while a
//! controlling thread polls it for progress, collects its result, and may cancel it.
//!
//! The controlling side is plain synchronous code: a UI timer, a render loop or a
//! console `main` calls [`Task::pump`] on every tick. No event loop is required;
//! tokio is used only for its channels, and optionally to host subscribers or
//! run bodies on a blocking pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  controlling thread                               background (Execute)
//! ┌─────────────────────────────────┐              ┌──────────────────────────────┐
//! │ Task<W, S, C>                   │   launch     │ runner::run_body             │
//! │  start(params) ─────────────────┼─────────────►│  skip if cancelled           │
//! │  pump()   ◄── drain ── ProgressStore ◄─ store ─┤  Work::run(params, &Context) │
//! │  await_result() / join()        │              │  Work::post_process          │
//! │  cancel() ─────► CancellationToken ◄── poll ───┤  catch Err/panic → cancel    │
//! │                  ◄──── oneshot Outcome ────────┤  send Outcome                │
//! │  Callbacks (pre_start, on_progress,            └──────────────────────────────┘
//! │   on_finished | on_cancelled)   │
//! └───────────────┬─────────────────┘
//!                 │ publish(Event)   (optional)
//!                 ▼
//!           Bus (broadcast) ──► SubscriberSet::attach ──► Subscribe::on_event
//! ```
//!
//! ### Lifecycle
//! ```text
//! NotStarted ── start ──► Running ── pump/await_result/join sees outcome ──► Finished
//!
//! finish transition (exactly once):
//!   ├─► drain remaining progress into on_progress
//!   ├─► store result
//!   ├─► cancelled? on_cancelled(&result) : on_finished(&result)
//!   ├─► status = Finished
//!   └─► return captured failure (only here, only once)
//!
//! drop while Running: cancel, wait for the body, no callbacks, no error
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                         |
//! |--------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Tasks**          | State machine driven from the controlling side.               | [`Task`], [`TaskBuilder`], [`TaskStatus`]  |
//! | **Bodies**         | Background half and controlling-side hooks.                   | [`Work`], [`WorkFn`], [`Callbacks`], [`Context`] |
//! | **Progress**       | Overwrite (mutex or lock-free) and ordered strategies.        | [`ProgressStore`], [`Latest`], [`AtomicLatest`], [`Queue`] |
//! | **Executors**      | Where the body runs.                                          | [`Execute`], [`ThreadExecutor`], [`TokioExecutor`] |
//! | **Events**         | Lifecycle events and fan-out to subscribers.                  | [`Bus`], [`Event`], [`Subscribe`], [`SubscriberSet`] |
//! | **Errors**         | Usage errors and deferred body failures.                      | [`StateError`], [`TaskError`]              |
//! | **Configuration**  | Thread naming, stack size, bus capacity.                      | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::thread;
//! use std::time::Duration;
//! use taskpump::{Callbacks, Context, Task, WorkFn};
//!
//! struct Printer;
//!
//! impl Callbacks<u32, u32> for Printer {
//!     fn on_progress(&mut self, pct: &u32) {
//!         println!("{pct}%");
//!     }
//!     fn on_finished(&mut self, result: &u32) {
//!         println!("done: {result}");
//!     }
//! }
//!
//! let work = WorkFn::new("percent", |steps: u32, ctx: &Context<u32>| {
//!     for i in 1..=steps {
//!         if ctx.is_cancelled() {
//!             return Ok(i);
//!         }
//!         ctx.publish_progress(i * 100 / steps);
//!     }
//!     Ok::<_, std::io::Error>(steps)
//! });
//!
//! let mut task = Task::builder(work).with_callbacks(Printer).build();
//! task.start(50)?;
//! while !task.pump()? {
//!     thread::sleep(Duration::from_millis(1));
//! }
//! assert_eq!(task.result(), Some(&50));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod config;
mod core;
mod error;
mod events;
mod executors;
mod progress;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Task, TaskBuilder, TaskStatus};
pub use error::{StateError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use executors::{Execute, Job, ThreadExecutor, TokioExecutor};
pub use progress::{AtomicLatest, AtomicValue, Latest, ProgressStore, Queue};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Callbacks, Context, Work, WorkFn};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

// Re-exported so hosts can build parent tokens without a direct dependency.
pub use tokio_util::sync::CancellationToken;
