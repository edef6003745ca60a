/// Lifecycle position of a [`Task`](crate::Task).
///
/// Moves `NotStarted → Running → Finished`, each transition exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    /// Constructed, `start` not called yet.
    #[default]
    NotStarted,
    /// Background side launched; finish transition not performed yet.
    Running,
    /// Finish transition done; the result is available.
    Finished,
}

impl TaskStatus {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::Running => "running",
            TaskStatus::Finished => "finished",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
