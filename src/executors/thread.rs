use std::thread;

use super::{Execute, Job};
use crate::config::Config;

/// Spawns one named OS thread per job.
///
/// Thread names follow [`Config::thread_name`]; the stack size follows
/// [`Config::stack_size`]. Threads are detached: completion is observed
/// through the task's outcome channel, not by joining.
#[derive(Debug, Clone, Default)]
pub struct ThreadExecutor {
    cfg: Config,
}

impl ThreadExecutor {
    /// Executor with default thread settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor using `cfg` for thread names and stack size.
    pub fn from_config(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }
}

impl Execute for ThreadExecutor {
    fn execute(&self, name: &str, job: Job) -> std::io::Result<()> {
        let mut builder = thread::Builder::new().name(self.cfg.thread_name(name));
        if let Some(size) = self.cfg.stack_size() {
            builder = builder.stack_size(size);
        }
        builder.spawn(job).map(drop)
    }
}
