//! # The task state machine.
//!
//! A [`Task`] owns one background execution of a [`Work`] and is driven from a
//! single controlling thread.
//!
//! ```text
//!              start()                      pump()/await_result()/join()
//! NotStarted ──────────► Running ──────────────────────────────────► Finished
//!     │   pre_start, Started            outcome ready: finish transition
//!     │   launch background job         (drain, result, on_finished | on_cancelled)
//!     │
//!     └─ drop(): nothing             drop() while Running: cancel, wait,
//!                                    no callbacks, no error (ShutdownForced)
//! ```
//!
//! ## Rules
//! - `start` works only once; later calls fail with [`StateError`].
//! - `cancel` is sticky and never blocks.
//! - The finish branch depends on the cancellation flag **at finish time**, not on
//!   whether the body honored it.
//! - A captured failure is returned by the call that performs the finish
//!   transition, and by no other call.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;

use super::{
    builder::TaskBuilder,
    capture::{ErrorCapture, Outcome},
    runner,
    status::TaskStatus,
};
use crate::{
    error::{StateError, TaskError},
    events::{Bus, Event, EventKind},
    executors::{Execute, Job},
    progress::{Latest, ProgressStore},
    tasks::{Callbacks, Work},
};

type Handle<W> = oneshot::Receiver<Outcome<<W as Work>::Output, <W as Work>::Error>>;

/// A cancellable background computation with progress, driven by polling.
///
/// Type parameters:
/// - `W`: the body ([`Work`])
/// - `S`: progress store ([`Latest`] by default; see [`TaskBuilder::queued`] and
///   [`TaskBuilder::atomic`])
/// - `C`: controlling-side hooks ([`Callbacks`]; `()` by default)
///
/// A task is not `Clone`: it stands for exactly one execution. Moving it is fine,
/// the state shared with the background side lives behind `Arc`s.
///
/// Dropping a running task blocks until the body returns. Bodies should check
/// [`Context::is_cancelled`](crate::Context::is_cancelled).
pub struct Task<W: Work, S = Latest<<W as Work>::Progress>, C = ()> {
    name: Arc<str>,
    work: Arc<W>,
    store: Arc<S>,
    token: CancellationToken,
    callbacks: C,
    executor: Arc<dyn Execute>,
    bus: Option<Bus>,

    status: TaskStatus,
    result: W::Output,
    handle: Option<Handle<W>>,
    capture: ErrorCapture<W::Error>,
    started_at: Option<Instant>,
}

impl<W: Work> Task<W> {
    /// Task with overwrite progress, no callbacks, running on a fresh thread.
    pub fn new(work: W) -> Self
    where
        W::Progress: Clone + Default,
    {
        TaskBuilder::new(work).build()
    }

    /// Starts a [`TaskBuilder`].
    pub fn builder(work: W) -> TaskBuilder<W> {
        TaskBuilder::new(work)
    }
}

impl<W: Work, S, C> Task<W, S, C> {
    pub(crate) fn assemble(
        name: Arc<str>,
        work: Arc<W>,
        store: Arc<S>,
        token: CancellationToken,
        callbacks: C,
        executor: Arc<dyn Execute>,
        bus: Option<Bus>,
    ) -> Self {
        Self {
            name,
            work,
            store,
            token,
            callbacks,
            executor,
            bus,
            status: TaskStatus::NotStarted,
            result: W::Output::default(),
            handle: None,
            capture: ErrorCapture::default(),
            started_at: None,
        }
    }

    /// Task name used in events and thread names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle position.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Requests cancellation. Idempotent, never blocks, allowed in any state.
    ///
    /// Cancelling before `start` makes the background side skip the body.
    pub fn cancel(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.publish(EventKind::CancelRequested);
    }

    /// True once cancellation was requested (by `cancel`, a parent token, or a failed body).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Clone of the task's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The stored result, once the task is `Finished`.
    pub fn result(&self) -> Option<&W::Output> {
        match self.status {
            TaskStatus::Finished => Some(&self.result),
            _ => None,
        }
    }

    /// The controlling-side hooks.
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Mutable access to the controlling-side hooks.
    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    fn publish(&self, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.publish(Event::new(Arc::clone(&self.name), kind));
        }
    }

    fn elapsed(&self) -> std::time::Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }
}

impl<W, S, C> Task<W, S, C>
where
    W: Work,
    S: ProgressStore<W::Progress>,
    C: Callbacks<W::Progress, W::Output>,
{
    /// Launches the body with `params` and returns immediately.
    ///
    /// `pre_start` runs here, before the body. If the executor refuses the job the
    /// task still moves to `Running`; the launch failure is delivered by the next
    /// `pump`/`await_result`.
    pub fn start(&mut self, params: W::Params) -> Result<(), StateError> {
        match self.status {
            TaskStatus::NotStarted => {}
            TaskStatus::Running => return Err(StateError::AlreadyRunning),
            TaskStatus::Finished => return Err(StateError::AlreadyFinished),
        }

        self.status = TaskStatus::Running;
        self.started_at = Some(Instant::now());
        self.callbacks.pre_start();
        self.publish(EventKind::Started);

        let (tx, rx) = oneshot::channel();
        self.handle = Some(rx);

        let work = Arc::clone(&self.work);
        let store = Arc::clone(&self.store);
        let token = self.token.clone();
        let bus = self.bus.clone();
        let name = Arc::clone(&self.name);
        let job: Job = Box::new(move || {
            let outcome = runner::run_body(&work, &store, params, &token, bus.as_ref(), &name);
            let _ = tx.send(outcome);
        });

        if let Err(err) = self.executor.execute(&self.name, job) {
            self.cancel();
            let (tx, rx) = oneshot::channel();
            let _ = tx.send(Outcome::failed(TaskError::Launch {
                reason: err.to_string(),
            }));
            self.handle = Some(rx);
        }
        Ok(())
    }

    /// Non-blocking tick for the controlling loop.
    ///
    /// - `NotStarted`: `Ok(false)`
    /// - `Running`, body still going: delivers progress, `Ok(false)`
    /// - `Running`, body done: finish transition, `Ok(true)` or the captured failure
    /// - `Finished`: `Ok(true)`
    pub fn pump(&mut self) -> Result<bool, TaskError<W::Error>> {
        match self.status {
            TaskStatus::Finished => return Ok(true),
            TaskStatus::NotStarted => return Ok(false),
            TaskStatus::Running => {}
        }
        let Some(rx) = self.handle.as_mut() else {
            return Ok(false);
        };

        let polled = rx.try_recv();
        match polled {
            Err(TryRecvError::Empty) => {
                self.deliver_progress();
                Ok(false)
            }
            Ok(outcome) => {
                self.handle = None;
                self.finish(outcome).map(|()| true)
            }
            Err(TryRecvError::Closed) => {
                self.handle = None;
                let outcome = self.abandoned();
                self.finish(outcome).map(|()| true)
            }
        }
    }

    /// Blocks until the body is done and returns the result.
    ///
    /// Performs the finish transition if `pump` has not. Once `Finished`, returns a
    /// clone of the stored result. Inside an async context prefer [`join`](Self::join).
    pub fn await_result(&mut self) -> Result<W::Output, TaskError<W::Error>> {
        match self.status {
            TaskStatus::NotStarted => Err(StateError::NotStarted.into()),
            TaskStatus::Finished => Ok(self.result.clone()),
            TaskStatus::Running => {
                let outcome = match self.handle.as_mut() {
                    Some(rx) => futures::executor::block_on(rx).ok(),
                    None => None,
                };
                self.settle(outcome)
            }
        }
    }

    /// Async counterpart of [`await_result`](Self::await_result).
    ///
    /// Cancel-safe: if the future is dropped before the body is done, the task
    /// stays `Running` and can still be pumped, awaited or dropped.
    pub async fn join(&mut self) -> Result<W::Output, TaskError<W::Error>> {
        match self.status {
            TaskStatus::NotStarted => Err(StateError::NotStarted.into()),
            TaskStatus::Finished => Ok(self.result.clone()),
            TaskStatus::Running => {
                let outcome = match self.handle.as_mut() {
                    Some(rx) => rx.await.ok(),
                    None => None,
                };
                self.settle(outcome)
            }
        }
    }

    fn settle(
        &mut self,
        outcome: Option<Outcome<W::Output, W::Error>>,
    ) -> Result<W::Output, TaskError<W::Error>> {
        self.handle = None;
        let outcome = match outcome {
            Some(outcome) => outcome,
            None => self.abandoned(),
        };
        self.finish(outcome)?;
        Ok(self.result.clone())
    }

    /// Outcome for a background side that went away without sending one.
    fn abandoned(&self) -> Outcome<W::Output, W::Error> {
        self.token.cancel();
        Outcome::failed(TaskError::Abandoned)
    }

    fn deliver_progress(&mut self) {
        let callbacks = &mut self.callbacks;
        self.store.drain(|value| callbacks.on_progress(value));
    }

    /// The one-time `Running → Finished` transition.
    fn finish(&mut self, outcome: Outcome<W::Output, W::Error>) -> Result<(), TaskError<W::Error>> {
        let callbacks = &mut self.callbacks;
        self.store.flush(|value| callbacks.on_progress(value));

        let Outcome { value, failure } = outcome;
        self.capture.arm(failure);
        self.result = value;

        let elapsed = self.elapsed();
        let kind = if self.token.is_cancelled() {
            self.callbacks.on_cancelled(&self.result);
            EventKind::Cancelled { elapsed }
        } else {
            self.callbacks.on_finished(&self.result);
            EventKind::Completed { elapsed }
        };
        self.publish(kind);
        self.status = TaskStatus::Finished;

        match self.capture.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<W: Work, S, C> fmt::Debug for Task<W, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<W: Work, S, C> Drop for Task<W, S, C> {
    /// Implicit shutdown: a running task is cancelled and waited for. No callbacks
    /// run and any captured failure is discarded.
    fn drop(&mut self) {
        if self.status != TaskStatus::Running {
            return;
        }
        self.token.cancel();
        if let Some(rx) = self.handle.take() {
            let _ = futures::executor::block_on(rx);
        }
        self.publish(EventKind::ShutdownForced {
            elapsed: self.elapsed(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{AtomicLatest, Queue};
    use crate::tasks::{Context, WorkFn};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    type Fail = &'static str;

    struct Record<P, R> {
        log: Vec<&'static str>,
        progress: Vec<P>,
        terminal: Option<R>,
    }

    impl<P, R> Default for Record<P, R> {
        fn default() -> Self {
            Self {
                log: Vec::new(),
                progress: Vec::new(),
                terminal: None,
            }
        }
    }

    impl<P: Clone, R: Clone> Callbacks<P, R> for Record<P, R> {
        fn pre_start(&mut self) {
            self.log.push("pre_start");
        }

        fn on_progress(&mut self, progress: &P) {
            self.progress.push(progress.clone());
        }

        fn on_finished(&mut self, result: &R) {
            self.log.push("on_finished");
            self.terminal = Some(result.clone());
        }

        fn on_cancelled(&mut self, result: &R) {
            self.log.push("on_cancelled");
            self.terminal = Some(result.clone());
        }
    }

    fn spin_until(flag: &AtomicBool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !flag.load(Ordering::Acquire) {
            assert!(Instant::now() < deadline, "timed out waiting for flag");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn labels(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<&'static str> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind.as_label())
            .collect()
    }

    fn spin_until_cancelled(ctx: &Context<impl Send + 'static>) {
        while !ctx.is_cancelled() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn triangle(n: u64, ctx: &Context<u64>) -> Result<u64, Infallible> {
        let mut acc = 0;
        for i in 0..=n {
            if ctx.is_cancelled() {
                break;
            }
            acc += i;
            ctx.publish_progress(acc);
        }
        Ok(acc)
    }

    #[test]
    fn test_new_task_is_not_started() {
        let mut task = Task::new(WorkFn::new("t", triangle));

        assert_eq!(task.status(), TaskStatus::NotStarted);
        assert!(task.result().is_none());
        assert!(matches!(task.pump(), Ok(false)));
        assert!(matches!(
            task.await_result(),
            Err(TaskError::State(StateError::NotStarted))
        ));
        assert_eq!(task.status(), TaskStatus::NotStarted);
    }

    #[test]
    fn test_start_out_of_order_is_rejected() {
        let release = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&release);
        let work = WorkFn::new("gated", move |(): (), _: &Context<u8>| {
            spin_until(&gate);
            Ok::<_, Fail>(5u32)
        });
        let mut task = Task::new(work);

        task.start(()).expect("first start");
        assert_eq!(task.status(), TaskStatus::Running);
        assert_eq!(task.start(()), Err(StateError::AlreadyRunning));

        release.store(true, Ordering::Release);
        assert_eq!(task.await_result().expect("result"), 5);
        assert_eq!(task.status(), TaskStatus::Finished);
        assert_eq!(task.start(()), Err(StateError::AlreadyFinished));
        assert_eq!(task.status(), TaskStatus::Finished);
    }

    struct FlagOnPreStart(Arc<AtomicBool>);

    impl Callbacks<u8, bool> for FlagOnPreStart {
        fn pre_start(&mut self) {
            self.0.store(true, Ordering::Release);
        }
    }

    #[test]
    fn test_pre_start_happens_before_body() {
        let flag = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&flag);
        let work = WorkFn::new("order", move |(): (), _: &Context<u8>| {
            Ok::<_, Fail>(seen.load(Ordering::Acquire))
        });
        let mut task = Task::builder(work)
            .with_callbacks(FlagOnPreStart(flag))
            .build();

        task.start(()).expect("start");
        assert!(task.await_result().expect("result"));
    }

    #[test]
    fn test_completion_runs_on_finished() {
        let mut task = Task::builder(WorkFn::new("t", triangle))
            .with_callbacks(Record::default())
            .build();

        task.start(4).expect("start");
        assert_eq!(task.await_result().expect("result"), 10);
        assert_eq!(task.result(), Some(&10));

        let rec = task.callbacks();
        assert_eq!(rec.log, vec!["pre_start", "on_finished"]);
        assert_eq!(rec.terminal, Some(10));
        assert!(!task.is_cancelled());
    }

    #[test]
    fn test_pump_drives_to_completion() {
        let mut task = Task::builder(WorkFn::new("t", triangle))
            .with_callbacks(Record::default())
            .build();
        task.start(1000).expect("start");

        let deadline = Instant::now() + Duration::from_secs(5);
        while !task.pump().expect("no failure") {
            assert!(Instant::now() < deadline);
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(task.status(), TaskStatus::Finished);
        assert!(matches!(task.pump(), Ok(true)));
        assert_eq!(task.result(), Some(&500_500));
        assert_eq!(task.callbacks().progress.last(), Some(&500_500));
        assert_eq!(task.callbacks().log, vec!["pre_start", "on_finished"]);
    }

    #[test]
    fn test_cancel_mid_run_returns_early_value() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let work = WorkFn::new("loop", move |(): (), ctx: &Context<u8>| {
            ctx.publish_progress(1);
            flag.store(true, Ordering::Release);
            spin_until_cancelled(ctx);
            Ok::<_, Fail>(-1i32)
        });
        let mut task = Task::builder(work).with_callbacks(Record::default()).build();

        task.start(()).expect("start");
        spin_until(&started);
        task.cancel();
        task.cancel();

        assert_eq!(task.await_result().expect("result"), -1);
        assert!(task.is_cancelled());
        let rec = task.callbacks();
        assert_eq!(rec.log, vec!["pre_start", "on_cancelled"]);
        assert_eq!(rec.terminal, Some(-1));
    }

    #[test]
    fn test_ignored_cancel_keeps_computed_value() {
        let started = Arc::new(AtomicBool::new(false));
        let release = Arc::new(AtomicBool::new(false));
        let (flag, gate) = (Arc::clone(&started), Arc::clone(&release));
        let work = WorkFn::new("stubborn", move |(): (), _: &Context<u8>| {
            flag.store(true, Ordering::Release);
            spin_until(&gate);
            Ok::<_, Fail>(42u32)
        });
        let mut task = Task::builder(work).with_callbacks(Record::default()).build();

        task.start(()).expect("start");
        spin_until(&started);
        task.cancel();
        release.store(true, Ordering::Release);

        assert_eq!(task.await_result().expect("result"), 42);
        // The branch follows the flag at finish time.
        assert_eq!(task.callbacks().log, vec!["pre_start", "on_cancelled"]);
        assert_eq!(task.callbacks().terminal, Some(42));
    }

    fn failing(n: u32, ctx: &Context<u32>) -> Result<u32, Fail> {
        for i in 0..n {
            ctx.publish_progress(i);
        }
        Err("bad input")
    }

    #[test]
    fn test_failure_surfaces_once_through_pump() {
        let mut task = Task::builder(WorkFn::new("fails", failing))
            .queued()
            .with_callbacks(Record::default())
            .build();
        task.start(3).expect("start");

        let deadline = Instant::now() + Duration::from_secs(5);
        let err = loop {
            match task.pump() {
                Ok(false) => {
                    assert!(Instant::now() < deadline);
                    thread::sleep(Duration::from_millis(1));
                }
                Ok(true) => panic!("failure was not surfaced"),
                Err(e) => break e,
            }
        };

        assert!(matches!(err, TaskError::Failed("bad input")));
        assert_eq!(task.status(), TaskStatus::Finished);
        assert!(task.is_cancelled());
        assert!(matches!(task.pump(), Ok(true)));
        assert_eq!(task.await_result().expect("no second delivery"), 0);

        let rec = task.callbacks();
        assert_eq!(rec.progress, vec![0, 1, 2]);
        assert_eq!(rec.log, vec!["pre_start", "on_cancelled"]);
    }

    #[test]
    fn test_failure_surfaces_once_through_await() {
        let mut task = Task::new(WorkFn::new("fails", failing));
        task.start(10).expect("start");

        let err = task.await_result().expect_err("failure");
        assert_eq!(err.into_failure(), Some("bad input"));
        assert_eq!(task.await_result().expect("no second delivery"), 0);
        assert!(matches!(task.pump(), Ok(true)));
    }

    #[test]
    fn test_panic_surfaces_as_panicked() {
        let work = WorkFn::new("panics", |(): (), _: &Context<u8>| -> Result<u8, Fail> {
            panic!("division by zero")
        });
        let mut task = Task::new(work);
        task.start(()).expect("start");

        match task.await_result() {
            Err(TaskError::Panicked { message }) => assert_eq!(message, "division by zero"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(task.is_cancelled());
    }

    #[test]
    fn test_post_process_runs_on_background() {
        struct Doubled;

        impl Work for Doubled {
            type Params = u32;
            type Progress = u32;
            type Output = u32;
            type Error = Fail;

            fn run(&self, params: u32, _ctx: &Context<u32>) -> Result<u32, Fail> {
                Ok(params)
            }

            fn post_process(&self, output: u32) -> Result<u32, Fail> {
                if output == 0 {
                    return Err("zero");
                }
                Ok(output * 2)
            }
        }

        let mut task = Task::new(Doubled);
        task.start(21).expect("start");
        assert_eq!(task.await_result().expect("result"), 42);

        let mut task = Task::new(Doubled);
        task.start(0).expect("start");
        assert!(matches!(task.await_result(), Err(TaskError::Failed("zero"))));
    }

    #[test]
    fn test_drop_while_running_waits_silently() {
        let started = Arc::new(AtomicBool::new(false));
        let exited = Arc::new(AtomicBool::new(false));
        let (s, e) = (Arc::clone(&started), Arc::clone(&exited));
        let work = WorkFn::new("late", move |(): (), ctx: &Context<u8>| {
            s.store(true, Ordering::Release);
            spin_until_cancelled(ctx);
            thread::sleep(Duration::from_millis(20));
            e.store(true, Ordering::Release);
            Err::<u8, Fail>("failure during shutdown")
        });

        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut task = Task::builder(work).with_bus(bus).build();
        task.start(()).expect("start");
        spin_until(&started);

        drop(task);
        assert!(exited.load(Ordering::Acquire));

        let kinds = labels(&mut rx);
        assert_eq!(kinds.first(), Some(&"started"));
        assert_eq!(kinds.last(), Some(&"shutdown-forced"));
        assert!(!kinds.contains(&"cancelled"));
        assert!(!kinds.contains(&"completed"));
    }

    #[test]
    fn test_drop_does_not_run_callbacks() {
        struct Loud(Arc<AtomicBool>);

        impl Callbacks<u8, u8> for Loud {
            fn on_finished(&mut self, _: &u8) {
                self.0.store(true, Ordering::Release);
            }

            fn on_cancelled(&mut self, _: &u8) {
                self.0.store(true, Ordering::Release);
            }
        }

        let called = Arc::new(AtomicBool::new(false));
        let work = WorkFn::new("loop", |(): (), ctx: &Context<u8>| {
            spin_until_cancelled(ctx);
            Ok::<u8, Fail>(1)
        });
        let mut task = Task::builder(work)
            .with_callbacks(Loud(Arc::clone(&called)))
            .build();
        task.start(()).expect("start");
        drop(task);

        assert!(!called.load(Ordering::Acquire));
    }

    #[test]
    fn test_overwrite_keeps_last_value() {
        let work = WorkFn::new("burst", |(): (), ctx: &Context<u32>| {
            (0..10).for_each(|i| ctx.publish_progress(i));
            Ok::<_, Fail>(())
        });
        let mut task = Task::builder(work).with_callbacks(Record::default()).build();
        task.start(()).expect("start");
        task.await_result().expect("result");

        assert_eq!(task.callbacks().progress.last(), Some(&9));
    }

    #[test]
    fn test_finish_does_not_repeat_delivered_progress() {
        let release = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&release);
        let work = WorkFn::new("once", move |(): (), ctx: &Context<u32>| {
            ctx.publish_progress(5);
            spin_until(&gate);
            Ok::<_, Fail>(())
        });
        let mut task = Task::builder(work).with_callbacks(Record::default()).build();
        task.start(()).expect("start");

        let deadline = Instant::now() + Duration::from_secs(5);
        while task.callbacks().progress.last() != Some(&5) {
            assert!(Instant::now() < deadline);
            assert!(matches!(task.pump(), Ok(false)));
            thread::sleep(Duration::from_millis(1));
        }
        let seen = task.callbacks().progress.len();
        release.store(true, Ordering::Release);
        task.await_result().expect("result");

        assert_eq!(task.callbacks().progress.len(), seen);
    }

    #[test]
    fn test_finish_without_progress_delivers_nothing() {
        let work = WorkFn::new("silent", |(): (), _: &Context<u32>| Ok::<_, Fail>(1u8));
        let mut task = Task::builder(work).with_callbacks(Record::default()).build();
        task.start(()).expect("start");
        task.await_result().expect("result");

        assert!(task.callbacks().progress.is_empty());
    }

    #[test]
    fn test_atomic_overwrite_keeps_last_value() {
        let work = WorkFn::new("burst", |(): (), ctx: &Context<f64>| {
            (0..10u8).for_each(|i| ctx.publish_progress(f64::from(i)));
            Ok::<_, Fail>(())
        });
        let mut task = Task::builder(work)
            .atomic()
            .with_callbacks(Record::default())
            .build();
        task.start(()).expect("start");
        task.await_result().expect("result");

        assert_eq!(task.callbacks().progress.last(), Some(&9.0));
    }

    #[test]
    fn test_queue_delivers_every_value_in_order() {
        const N: u32 = 1000;
        let work = WorkFn::new("all", |n: u32, ctx: &Context<u32>| {
            (0..n).for_each(|i| ctx.publish_progress(i));
            Ok::<_, Fail>(n)
        });
        let mut task = Task::builder(work)
            .with_store::<Queue<u32>>()
            .with_callbacks(Record::default())
            .build();
        task.start(N).expect("start");

        let deadline = Instant::now() + Duration::from_secs(5);
        while !task.pump().expect("no failure") {
            assert!(Instant::now() < deadline);
            thread::yield_now();
        }

        assert_eq!(task.callbacks().progress, (0..N).collect::<Vec<_>>());
    }

    struct Rows;

    impl Work for Rows {
        type Params = (u32, u32);
        type Progress = (u32, u32);
        type Output = u32;
        type Error = Infallible;

        fn run(&self, (rows, cols): (u32, u32), ctx: &Context<(u32, u32)>) -> Result<u32, Infallible> {
            for r in 0..rows {
                for c in 0..cols {
                    ctx.publish_progress((r, c));
                }
            }
            Ok(rows * cols)
        }

        fn should_merge(&self, last: &(u32, u32), next: &(u32, u32)) -> bool {
            last.0 == next.0
        }
    }

    #[test]
    fn test_merge_predicate_collapses_queue() {
        let mut task = Task::builder(Rows)
            .queued()
            .with_callbacks(Record::default())
            .build();
        task.start((3, 4)).expect("start");

        assert_eq!(task.await_result().expect("result"), 12);
        assert_eq!(task.callbacks().progress, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_round_trip_matches_direct_call() {
        let direct = WorkFn::new("direct", triangle)
            .run(250, &Context::detached())
            .expect("direct");

        let mut task = Task::new(WorkFn::new("t", triangle));
        task.start(250).expect("start");
        assert_eq!(task.await_result().expect("result"), direct);
    }

    #[test]
    fn test_cancel_before_start_skips_body() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let work = WorkFn::new("skipped", move |(): (), _: &Context<u8>| {
            flag.store(true, Ordering::Release);
            Ok::<_, Fail>(7u8)
        });
        let mut task = Task::builder(work).with_callbacks(Record::default()).build();

        task.cancel();
        task.start(()).expect("start");
        assert_eq!(task.await_result().expect("result"), 0);
        assert!(!ran.load(Ordering::Acquire));
        assert_eq!(task.callbacks().log, vec!["pre_start", "on_cancelled"]);
    }

    struct Refuse;

    impl Execute for Refuse {
        fn execute(&self, _name: &str, _job: Job) -> std::io::Result<()> {
            Err(std::io::Error::other("no threads left"))
        }
    }

    #[test]
    fn test_launch_failure_is_deferred() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut task = Task::builder(WorkFn::new("t", triangle))
            .with_executor(Arc::new(Refuse))
            .with_callbacks(Record::default())
            .with_bus(bus)
            .build();

        task.start(3).expect("start itself succeeds");
        assert_eq!(task.status(), TaskStatus::Running);
        assert!(task.is_cancelled());

        match task.pump() {
            Err(TaskError::Launch { reason }) => assert!(reason.contains("no threads left")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(task.await_result().expect("delivered once"), 0);
        assert_eq!(task.callbacks().log, vec!["pre_start", "on_cancelled"]);
        assert_eq!(labels(&mut rx), vec!["started", "cancel-requested", "cancelled"]);
    }

    #[test]
    fn test_parent_token_cancels_task() {
        let parent = CancellationToken::new();
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let work = WorkFn::new("child", move |(): (), ctx: &Context<u8>| {
            flag.store(true, Ordering::Release);
            spin_until_cancelled(ctx);
            Ok::<_, Fail>(3u8)
        });
        let mut task = Task::builder(work).with_parent(&parent).build();

        task.start(()).expect("start");
        spin_until(&started);
        parent.cancel();
        assert_eq!(task.await_result().expect("result"), 3);
        assert!(task.is_cancelled());
        assert!(task.token().is_cancelled());
    }

    #[test]
    fn test_events_follow_lifecycle() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut task = Task::builder(WorkFn::new("evented", triangle))
            .with_bus(bus)
            .build();
        task.start(3).expect("start");
        task.await_result().expect("result");

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        let kinds: Vec<_> = events.iter().map(|ev| ev.kind.as_label()).collect();
        assert_eq!(kinds, vec!["started", "completed"]);
        assert!(events.iter().all(|ev| &*ev.source == "evented"));
        assert!(events[1].is_terminal());
    }

    #[test]
    fn test_custom_name_and_config() {
        let cfg = crate::Config {
            thread_prefix: "calc".into(),
            ..crate::Config::default()
        };
        let work = WorkFn::new("ignored", |(): (), _: &Context<u8>| {
            Ok::<_, Fail>(thread::current().name().map(str::to_owned))
        });
        let mut task = Task::builder(work).with_name("sampler").with_config(cfg).build();

        assert_eq!(task.name(), "sampler");
        task.start(()).expect("start");
        assert_eq!(task.await_result().expect("result").as_deref(), Some("calc-sampler"));
    }

    #[test]
    fn test_tokio_executor_runs_on_blocking_pool() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .expect("runtime");
        let exec = crate::TokioExecutor::new(rt.handle().clone());

        let mut task = Task::builder(WorkFn::new("t", triangle))
            .with_executor(Arc::new(exec))
            .build();
        task.start(10).expect("start");
        assert_eq!(task.await_result().expect("result"), 55);
    }

    #[tokio::test]
    async fn test_join_from_async_host() {
        let mut task = Task::builder(WorkFn::new("t", triangle))
            .with_store::<AtomicLatest<u64>>()
            .build();
        task.start(100).expect("start");

        assert_eq!(task.join().await.expect("result"), 5050);
        assert_eq!(task.status(), TaskStatus::Finished);
        assert_eq!(task.join().await.expect("cached"), 5050);
    }

    fn exits_late(exited: &Arc<AtomicBool>) -> impl Work<Params = (), Progress = u8, Output = u8, Error = Fail> {
        let flag = Arc::clone(exited);
        WorkFn::new("exits-late", move |(): (), ctx: &Context<u8>| {
            spin_until_cancelled(ctx);
            thread::sleep(Duration::from_millis(200));
            flag.store(true, Ordering::Release);
            Ok::<_, Fail>(1u8)
        })
    }

    #[tokio::test]
    async fn test_interrupted_join_still_waits_on_drop() {
        let exited = Arc::new(AtomicBool::new(false));
        let mut task = Task::new(exits_late(&exited));
        task.start(()).expect("start");

        let waited = tokio::time::timeout(Duration::from_millis(20), task.join()).await;
        assert!(waited.is_err());
        assert_eq!(task.status(), TaskStatus::Running);
        assert!(matches!(task.pump(), Ok(false)));

        drop(task);
        assert!(exited.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_join_resumes_after_interruption() {
        let exited = Arc::new(AtomicBool::new(false));
        let mut task = Task::new(exits_late(&exited));
        task.start(()).expect("start");

        let waited = tokio::time::timeout(Duration::from_millis(20), task.join()).await;
        assert!(waited.is_err());

        task.cancel();
        assert_eq!(task.join().await.expect("result"), 1);
        assert!(exited.load(Ordering::Acquire));
        assert_eq!(task.status(), TaskStatus::Finished);
    }

    #[tokio::test]
    async fn test_join_before_start_fails() {
        let mut task = Task::new(WorkFn::new("t", triangle));
        assert!(matches!(
            task.join().await,
            Err(TaskError::State(StateError::NotStarted))
        ));
    }
}
