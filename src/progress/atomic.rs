use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::ProgressStore;

/// Progress types that fit losslessly in 64 bits.
///
/// Implemented for `bool`, `char`, `f32`, `f64` and all integers up to 64 bits.
pub trait AtomicValue: Copy + Default + Send + Sync + 'static {
    /// Packs the value.
    fn into_bits(self) -> u64;
    /// Unpacks a value produced by [`into_bits`](AtomicValue::into_bits).
    fn from_bits(bits: u64) -> Self;
}

macro_rules! impl_atomic_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl AtomicValue for $t {
                #[inline]
                fn into_bits(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_bits(bits: u64) -> Self {
                    bits as $t
                }
            }
        )*
    };
}

impl_atomic_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl AtomicValue for bool {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn from_bits(bits: u64) -> Self {
        bits != 0
    }
}

impl AtomicValue for char {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(u32::from(self))
    }

    #[inline]
    fn from_bits(bits: u64) -> Self {
        char::from_u32(bits as u32).unwrap_or_default()
    }
}

impl AtomicValue for f32 {
    #[inline]
    fn into_bits(self) -> u64 {
        u64::from(self.to_bits())
    }

    #[inline]
    fn from_bits(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl AtomicValue for f64 {
    #[inline]
    fn into_bits(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

/// Lock-free overwrite strategy for small `Copy` progress types.
///
/// Same contract as [`Latest`](super::Latest): one slot, starting at
/// `P::default()`, delivered once per drain.
#[derive(Debug)]
pub struct AtomicLatest<P> {
    bits: AtomicU64,
    fresh: AtomicBool,
    _value: PhantomData<fn() -> P>,
}

impl<P: AtomicValue> Default for AtomicLatest<P> {
    fn default() -> Self {
        Self {
            bits: AtomicU64::new(P::default().into_bits()),
            fresh: AtomicBool::new(false),
            _value: PhantomData,
        }
    }
}

impl<P: AtomicValue> AtomicLatest<P> {
    /// Returns the current slot.
    pub fn get(&self) -> P {
        P::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl<P: AtomicValue> ProgressStore<P> for AtomicLatest<P> {
    fn store<M>(&self, value: P, _merge: M)
    where
        M: FnOnce(&P, &P) -> bool,
    {
        self.bits.store(value.into_bits(), Ordering::Release);
        self.fresh.store(true, Ordering::Release);
    }

    fn drain<F>(&self, mut deliver: F)
    where
        F: FnMut(&P),
    {
        // Clear before reading: a racing store re-marks the slot and is flushed again.
        self.fresh.store(false, Ordering::Release);
        deliver(&self.get());
    }

    fn flush<F>(&self, mut deliver: F)
    where
        F: FnMut(&P),
    {
        if self.fresh.swap(false, Ordering::AcqRel) {
            deliver(&self.get());
        }
    }
}
