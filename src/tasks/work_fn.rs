//! # Function-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn(A, &Context<P>) -> Result<O, E>`. The closure
//! is shared with the background side, so it must be `Send + Sync`; captured
//! state that needs mutation should sit behind a lock or an atomic.
//!
//! ## Example
//! ```rust
//! use taskpump::{Context, Task, TaskStatus, WorkFn};
//!
//! let work = WorkFn::new("sum", |n: u64, ctx: &Context<u64>| {
//!     let mut acc = 0;
//!     for i in 0..=n {
//!         if ctx.is_cancelled() {
//!             break;
//!         }
//!         acc += i;
//!         ctx.publish_progress(acc);
//!     }
//!     Ok::<_, std::convert::Infallible>(acc)
//! });
//!
//! let mut task = Task::new(work);
//! task.start(100).unwrap();
//! assert_eq!(task.await_result().unwrap(), 5050);
//! assert_eq!(task.status(), TaskStatus::Finished);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::tasks::{Context, Work};

/// Closure-backed [`Work`] implementation.
///
/// Type parameters: `A` params, `P` progress, `O` output, `E` error.
pub struct WorkFn<F, A, P, O, E> {
    name: Cow<'static, str>,
    f: F,
    _types: PhantomData<fn(A) -> (P, O, E)>,
}

impl<F, A, P, O, E> fmt::Debug for WorkFn<F, A, P, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkFn").field("name", &self.name).finish()
    }
}

impl<F, A, P, O, E> WorkFn<F, A, P, O, E>
where
    F: Fn(A, &Context<P>) -> Result<O, E>,
{
    /// Creates a new function-backed work item.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _types: PhantomData,
        }
    }
}

impl<F, A, P, O, E> Work for WorkFn<F, A, P, O, E>
where
    F: Fn(A, &Context<P>) -> Result<O, E> + Send + Sync + 'static, // Fn, not FnMut
    A: Send + 'static,
    P: Send + 'static,
    O: Default + Clone + Send + 'static,
    E: Send + 'static,
{
    type Params = A;
    type Progress = P;
    type Output = O;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, params: A, ctx: &Context<P>) -> Result<O, E> {
        (self.f)(params, ctx)
    }
}
