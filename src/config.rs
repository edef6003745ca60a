//! # Runtime configuration.
//!
//! Provides [`Config`], the centralized settings for launching tasks.
//!
//! Config is used in two ways:
//! 1. **Executor creation**: `ThreadExecutor::from_config(&config)`
//! 2. **Task building**: `Task::builder(work).with_config(config)`
//!
//! ## Sentinel values
//! - `stack_size = 0` → platform default stack size
//! - `bus_capacity = 0` → clamped to 1 by [`Bus`](crate::Bus)

use std::borrow::Cow;

/// Settings for background threads and the event bus.
///
/// ## Field semantics
/// - `thread_prefix`: prefix of background thread names (`"{prefix}-{task}"`)
/// - `stack_size`: background thread stack size in bytes (`0` = platform default)
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Prefix used when naming background threads.
    pub thread_prefix: Cow<'static, str>,

    /// Stack size for background threads, in bytes.
    ///
    /// - `0` = inherit the platform default
    /// - `n > 0` = request `n` bytes
    pub stack_size: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers lagging behind more than `bus_capacity` events skip
    /// older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the requested stack size as an `Option`.
    ///
    /// - `None` → platform default
    /// - `Some(n)` → `n` bytes
    #[inline]
    pub fn stack_size(&self) -> Option<usize> {
        if self.stack_size == 0 {
            None
        } else {
            Some(self.stack_size)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Builds the thread name for a task.
    #[inline]
    pub fn thread_name(&self, task: &str) -> String {
        format!("{}-{}", self.thread_prefix, task)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `thread_prefix = "taskpump"`
    /// - `stack_size = 0` (platform default)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            thread_prefix: Cow::Borrowed("taskpump"),
            stack_size: 0,
            bus_capacity: 1024,
        }
    }
}
