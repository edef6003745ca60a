use parking_lot::Mutex;

use super::ProgressStore;

/// Overwrite strategy guarded by a mutex.
///
/// Holds a single slot starting at `P::default()`. Each drain delivers the
/// current slot exactly once, even if nothing was published since the last one.
#[derive(Debug, Default)]
pub struct Latest<P> {
    slot: Mutex<Slot<P>>,
}

#[derive(Debug, Default)]
struct Slot<P> {
    value: P,
    fresh: bool,
}

impl<P: Clone> Latest<P> {
    /// Returns a copy of the current slot.
    pub fn get(&self) -> P {
        self.slot.lock().value.clone()
    }

    fn take_if(&self, only_fresh: bool) -> Option<P> {
        let mut slot = self.slot.lock();
        if only_fresh && !slot.fresh {
            return None;
        }
        slot.fresh = false;
        Some(slot.value.clone())
    }
}

impl<P> ProgressStore<P> for Latest<P>
where
    P: Clone + Default + Send + 'static,
{
    fn store<M>(&self, value: P, _merge: M)
    where
        M: FnOnce(&P, &P) -> bool,
    {
        let mut slot = self.slot.lock();
        slot.value = value;
        slot.fresh = true;
    }

    fn drain<F>(&self, mut deliver: F)
    where
        F: FnMut(&P),
    {
        // Clone out so the callback never runs under the lock.
        if let Some(current) = self.take_if(false) {
            deliver(&current);
        }
    }

    fn flush<F>(&self, mut deliver: F)
    where
        F: FnMut(&P),
    {
        if let Some(current) = self.take_if(true) {
            deliver(&current);
        }
    }
}
