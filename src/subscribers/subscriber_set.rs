//! # Per-subscriber delivery off a shared bus.
//!
//! [`SubscriberSet::attach`] subscribes once to the [`Bus`] for every
//! [`Subscribe`] implementor and spawns a worker that feeds that receiver into
//! `on_event`. The broadcast ring is the only queue.
//!
//! ```text
//!             ┌─► receiver 1 ─► worker 1 ─► accepts? ─► on_event
//! Bus ────────┼─► receiver 2 ─► worker 2 ─► accepts? ─► on_event
//!             └─► receiver N ─► worker N ─► ...
//!
//! worker N fell behind ─► SubscriberLagged { skipped }   (back onto the bus)
//! on_event panicked    ─► SubscriberPanicked { message }
//! ```
//!
//! Workers stop when the set is shut down or dropped. A bus clone lives in every
//! worker, so waiting for the bus to close would never end.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Running subscriber workers attached to one bus.
///
/// Must be created inside a tokio runtime.
pub struct SubscriberSet {
    stop: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Subscribes each of `subs` to `bus` and starts its worker.
    ///
    /// Events published after this call returns reach every subscriber.
    #[must_use]
    pub fn attach(bus: &Bus, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let stop = CancellationToken::new();
        let workers = subs
            .into_iter()
            .map(|sub| {
                let rx = bus.subscribe();
                tokio::spawn(deliver(sub, rx, bus.clone(), stop.clone()))
            })
            .collect();
        Self { stop, workers }
    }

    /// Number of attached subscribers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Stops every worker and waits for in-flight `on_event` calls.
    ///
    /// Events still queued in a receiver are not delivered.
    pub async fn shutdown(mut self) {
        self.stop.cancel();
        for worker in std::mem::take(&mut self.workers) {
            let _ = worker.await;
        }
    }
}

impl Drop for SubscriberSet {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn deliver(
    sub: Arc<dyn Subscribe>,
    mut rx: Receiver<Event>,
    bus: Bus,
    stop: CancellationToken,
) {
    loop {
        let received = tokio::select! {
            biased;
            () = stop.cancelled() => break,
            res = rx.recv() => res,
        };
        match received {
            Ok(ev) if sub.accepts(&ev) => {
                let call = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
                if let Err(payload) = call.await {
                    // A subscriber that panics on panic reports would feed itself.
                    if !matches!(ev.kind, EventKind::SubscriberPanicked { .. }) {
                        let message = panic_message(&*payload).into();
                        bus.publish(Event::new(sub.name(), EventKind::SubscriberPanicked { message }));
                    }
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                bus.publish(Event::new(sub.name(), EventKind::SubscriberLagged { skipped }));
            }
            Err(RecvError::Closed) => break,
        }
    }
}
