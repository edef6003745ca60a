//! # Progress delivery strategies.
//!
//! A [`ProgressStore`] sits between the background side (which publishes) and the
//! controlling side (which drains on every `pump` tick). Every store is safe to
//! `store` from the background while `drain` runs on the controlling side; a value
//! is either fully visible to the next drain or not yet visible.
//!
//! Overwrite stores repeat their current slot on every `drain`, so a polling
//! host can redraw on each tick. The finish transition calls
//! [`ProgressStore::flush`] instead, which only delivers values not seen yet.
//!
//! | Store              | Strategy  | Delivery per drain                         | Bound on `P`            |
//! |--------------------|-----------|--------------------------------------------|-------------------------|
//! | [`Latest`]         | overwrite | current slot (intermediate values lost)    | `Clone + Default`       |
//! | [`AtomicLatest`]   | overwrite | current slot, lock-free                    | [`AtomicValue`]         |
//! | [`Queue`]          | ordered   | every kept value, in publish order         | none                    |
//!
//! Cancellation filtering happens one level up, in
//! [`Context::publish_progress`](crate::Context::publish_progress).

mod atomic;
mod latest;
mod queue;

pub use atomic::{AtomicLatest, AtomicValue};
pub use latest::Latest;
pub use queue::Queue;

/// Storage strategy for progress values of type `P`.
///
/// `store` is only ever called from the task's background side (one body per
/// task), `drain` only from the controlling side.
pub trait ProgressStore<P>: Default + Send + Sync + 'static {
    /// Records a published value.
    ///
    /// `merge(&last, &value)` is consulted by ordered stores to decide whether
    /// `value` replaces the last queued entry; overwrite stores ignore it.
    fn store<M>(&self, value: P, merge: M)
    where
        M: FnOnce(&P, &P) -> bool;

    /// Hands every deliverable value to `deliver`, in publish order.
    fn drain<F>(&self, deliver: F)
    where
        F: FnMut(&P);

    /// Like [`drain`](Self::drain), but skips values an earlier drain already
    /// delivered. The finish transition uses this for its last pass.
    fn flush<F>(&self, deliver: F)
    where
        F: FnMut(&P),
    {
        self.drain(deliver);
    }
}
