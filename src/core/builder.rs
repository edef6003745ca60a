use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::task::Task;
use crate::{
    config::Config,
    events::Bus,
    executors::{Execute, ThreadExecutor},
    progress::{AtomicLatest, AtomicValue, Latest, ProgressStore, Queue},
    tasks::{Callbacks, Work},
};

/// Builder for a [`Task`] with non-default callbacks, progress strategy,
/// executor or event bus.
///
/// The progress store is selected by type and created in [`build`](Self::build).
///
/// ```
/// use taskpump::{Callbacks, Context, Task, WorkFn};
///
/// #[derive(Default)]
/// struct Collect(Vec<u32>);
///
/// impl Callbacks<u32, u32> for Collect {
///     fn on_progress(&mut self, p: &u32) {
///         self.0.push(*p);
///     }
/// }
///
/// let work = WorkFn::new("count", |n: u32, ctx: &Context<u32>| {
///     (0..n).for_each(|i| ctx.publish_progress(i));
///     Ok::<_, ()>(n)
/// });
/// let mut task = Task::builder(work)
///     .queued()
///     .with_callbacks(Collect::default())
///     .build();
///
/// task.start(3).unwrap();
/// assert_eq!(task.await_result().unwrap(), 3);
/// assert_eq!(task.callbacks().0, vec![0, 1, 2]);
/// ```
pub struct TaskBuilder<W: Work, S = Latest<<W as Work>::Progress>, C = ()> {
    work: W,
    callbacks: C,
    name: Option<Cow<'static, str>>,
    cfg: Config,
    executor: Option<Arc<dyn Execute>>,
    bus: Option<Bus>,
    parent: Option<CancellationToken>,
    _store: PhantomData<fn() -> S>,
}

impl<W: Work> TaskBuilder<W> {
    /// Starts a builder with overwrite progress, no callbacks and a thread executor.
    pub fn new(work: W) -> Self {
        Self {
            work,
            callbacks: (),
            name: None,
            cfg: Config::default(),
            executor: None,
            bus: None,
            parent: None,
            _store: PhantomData,
        }
    }
}

impl<W: Work, S, C> TaskBuilder<W, S, C> {
    /// Sets the controlling-side hooks.
    pub fn with_callbacks<C2>(self, callbacks: C2) -> TaskBuilder<W, S, C2>
    where
        C2: Callbacks<W::Progress, W::Output>,
    {
        TaskBuilder {
            work: self.work,
            callbacks,
            name: self.name,
            cfg: self.cfg,
            executor: self.executor,
            bus: self.bus,
            parent: self.parent,
            _store: PhantomData,
        }
    }

    /// Selects the progress store by type.
    pub fn with_store<S2>(self) -> TaskBuilder<W, S2, C>
    where
        S2: ProgressStore<W::Progress>,
    {
        TaskBuilder {
            work: self.work,
            callbacks: self.callbacks,
            name: self.name,
            cfg: self.cfg,
            executor: self.executor,
            bus: self.bus,
            parent: self.parent,
            _store: PhantomData,
        }
    }

    /// Ordered progress: every kept value is delivered (see [`Work::should_merge`]).
    pub fn queued(self) -> TaskBuilder<W, Queue<W::Progress>, C> {
        self.with_store()
    }

    /// Lock-free overwrite progress for small `Copy` progress types.
    pub fn atomic(self) -> TaskBuilder<W, AtomicLatest<W::Progress>, C>
    where
        W::Progress: AtomicValue,
    {
        self.with_store()
    }

    /// Overrides [`Work::name`] for events and thread names.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Runs the background side on `executor` instead of a fresh thread.
    pub fn with_executor(mut self, executor: Arc<dyn Execute>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Thread settings for the default executor.
    ///
    /// Ignored when an explicit executor is set.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Publishes lifecycle events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Makes the task's token a child of `parent`: cancelling the parent cancels the task.
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.parent = Some(parent.clone());
        self
    }
}

impl<W, S, C> TaskBuilder<W, S, C>
where
    W: Work,
    S: ProgressStore<W::Progress>,
    C: Callbacks<W::Progress, W::Output>,
{
    /// Builds the task in the `NotStarted` state.
    pub fn build(self) -> Task<W, S, C> {
        let name: Arc<str> = match self.name {
            Some(name) => Arc::from(name.as_ref()),
            None => Arc::from(self.work.name()),
        };
        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(ThreadExecutor::from_config(&self.cfg)));
        let token = self
            .parent
            .map(|parent| parent.child_token())
            .unwrap_or_default();

        Task::assemble(
            name,
            Arc::new(self.work),
            Arc::new(S::default()),
            token,
            self.callbacks,
            executor,
            self.bus,
        )
    }
}
