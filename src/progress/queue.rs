use std::collections::VecDeque;

use parking_lot::Mutex;

use super::ProgressStore;

/// Ordered strategy: every kept value is delivered exactly once, in publish order.
///
/// A merge predicate may collapse the newest value into the last queued one.
#[derive(Debug)]
pub struct Queue<P> {
    items: Mutex<VecDeque<P>>,
}

impl<P> Default for Queue<P> {
    fn default() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }
}

impl<P> Queue<P> {
    /// Number of values waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.items.lock().len()
    }
}

impl<P> ProgressStore<P> for Queue<P>
where
    P: Send + 'static,
{
    fn store<M>(&self, value: P, merge: M)
    where
        M: FnOnce(&P, &P) -> bool,
    {
        let mut items = self.items.lock();
        let collapse = items.back().is_some_and(|last| merge(last, &value));
        if collapse {
            items.pop_back();
        }
        items.push_back(value);
    }

    fn drain<F>(&self, mut deliver: F)
    where
        F: FnMut(&P),
    {
        let batch = std::mem::take(&mut *self.items.lock());
        for item in &batch {
            deliver(item);
        }
    }
}
