//! # Event subscribers.
//!
//! [`Subscribe`] is the handler trait; [`SubscriberSet`] attaches handlers to a
//! [`Bus`](crate::Bus) and runs them on a tokio runtime.
//!
//! ```text
//! Task ── publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter
//!                                                 ├──► Metrics
//!                                                 └──► Custom
//! ```
//!
//! Tasks themselves never need a runtime: publishing is a non-blocking broadcast
//! send, so a GUI thread or a plain `main` can publish while a runtime elsewhere
//! drives the subscribers.

mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
