//! # Subscriber trait
//!
//! A [`Subscribe`] implementor reacts to task events. [`SubscriberSet::attach`](crate::SubscriberSet::attach)
//! gives every subscriber its own bus receiver and a worker loop, so one slow
//! subscriber only ever lags itself.

use async_trait::async_trait;

use crate::events::Event;

/// Handler for task events.
///
/// ```no_run
/// use async_trait::async_trait;
/// use taskpump::{Event, EventKind, Subscribe};
///
/// struct Failures;
///
/// #[async_trait]
/// impl Subscribe for Failures {
///     async fn on_event(&self, event: &Event) {
///         eprintln!("{} failed: {:?}", event.source, event.reason());
///     }
///
///     fn accepts(&self, event: &Event) -> bool {
///         matches!(event.kind, EventKind::Failed { .. })
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one accepted event. Runs on the subscriber's own worker.
    async fn on_event(&self, event: &Event);

    /// Source name used in `SubscriberLagged`/`SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Filter checked before `on_event`; everything passes by default.
    fn accepts(&self, _event: &Event) -> bool {
        true
    }
}
