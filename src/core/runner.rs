//! # The background closure.
//!
//! Runs one task body on the background side and turns whatever happens into an
//! [`Outcome`]. Nothing here raises: errors and panics become captured failures.
//!
//! ```text
//! cancelled already? ── yes ──► Outcome::ok(default)          (body skipped)
//!        │ no
//!        ▼
//! catch_unwind(run → post_process)
//!        ├─ Ok(value)  ──► Outcome::ok(value)
//!        ├─ Err(e)     ──► cancel, publish Failed, Outcome::failed(Failed(e))
//!        └─ panic      ──► cancel, publish Failed, Outcome::failed(Panicked)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::capture::Outcome;
use crate::{
    error::{TaskError, panic_message},
    events::{Bus, Event, EventKind},
    progress::ProgressStore,
    tasks::{Context, Work},
};

/// Builds the context handed to `run`: publishes land in `store`, merged by
/// `work.should_merge`.
pub(crate) fn context_for<W, S>(
    work: &Arc<W>,
    store: &Arc<S>,
    token: &CancellationToken,
) -> Context<W::Progress>
where
    W: Work,
    S: ProgressStore<W::Progress>,
{
    let work = Arc::clone(work);
    let store = Arc::clone(store);
    Context::new(token.clone(), move |value| {
        store.store(value, |last, next| work.should_merge(last, next));
    })
}

/// Executes the body once and packages the outcome.
pub(crate) fn run_body<W, S>(
    work: &Arc<W>,
    store: &Arc<S>,
    params: W::Params,
    token: &CancellationToken,
    bus: Option<&Bus>,
    name: &Arc<str>,
) -> Outcome<W::Output, W::Error>
where
    W: Work,
    S: ProgressStore<W::Progress>,
{
    if token.is_cancelled() {
        return Outcome::ok(W::Output::default());
    }

    let ctx = context_for(work, store, token);
    let res = panic::catch_unwind(AssertUnwindSafe(|| {
        work.run(params, &ctx)
            .and_then(|output| work.post_process(output))
    }));

    let failure = match res {
        Ok(Ok(output)) => return Outcome::ok(output),
        Ok(Err(e)) => TaskError::Failed(e),
        Err(payload) => TaskError::Panicked {
            message: panic_message(&*payload),
        },
    };

    token.cancel();
    if let Some(bus) = bus {
        publish_failed(bus, name, &failure);
    }
    Outcome::failed(failure)
}

/// Publishes `Failed`; the body's error type carries no `Display` bound,
/// so only panics contribute their message.
fn publish_failed<E>(bus: &Bus, name: &Arc<str>, failure: &TaskError<E>) {
    let reason = match failure {
        TaskError::Panicked { message } => format!("panic: {message}"),
        other => other.as_label().to_string(),
    };
    bus.publish(Event::new(
        Arc::clone(name),
        EventKind::Failed {
            reason: reason.into(),
        },
    ));
}
