//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by tasks and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Task` (controlling side: start, cancel, finish, forced shutdown),
//!   the background closure (captured failures), `SubscriberSet` workers (lag/panic).
//! - **Consumers**: `SubscriberSet::attach()` gives each subscriber its own
//!   receiver; any other receiver comes from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
