//! A cell whose writes are synchronized by something other than the cell itself.
//!
//! The usual case is data written by one core before it sets a [`Latch`][l] and read by other
//! cores only after they observe that latch. The cell places the unsafety on the writer.
//!
//! [l]: crate::Latch

use core::cell::UnsafeCell;

/// Wrapper for values that are modified in a thread-safe manner that is not visible to Rust.
#[derive(Debug)]
pub struct ControlledModificationCell<T> {
    /// The wrapped value.
    value: UnsafeCell<T>,
}

// SAFETY:
// Writers guarantee that no access overlaps a write, so sharing the cell only hands out shared
// references to `T`, which requires `T: Sync`. The value may have been written by another thread,
// which requires `T: Send`.
unsafe impl<T: Send + Sync> Sync for ControlledModificationCell<T> {}

impl<T> ControlledModificationCell<T> {
    /// Creates a new [`ControlledModificationCell`] holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    /// Returns a shared reference to the wrapped value.
    pub fn get(&self) -> &T {
        // SAFETY:
        // Per the contract of `set()`, no write can overlap the lifetime of this reference.
        unsafe { &*self.value.get() }
    }

    /// Replaces the wrapped value with `value`.
    ///
    /// # Safety
    ///
    /// - No reference produced by [`ControlledModificationCell::get()`] may be alive, and no other
    ///   call to this function may run concurrently.
    /// - Any core that later calls [`ControlledModificationCell::get()`] must be ordered after
    ///   this call by synchronization performed outside of this type.
    pub unsafe fn set(&self, value: T) {
        // SAFETY:
        // The caller guarantees exclusive access for the duration of the write.
        unsafe { *self.value.get() = value }
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use super::ControlledModificationCell;
    use crate::Latch;

    #[test]
    fn value_published_through_latch() {
        let shared = Arc::new((Latch::new(), ControlledModificationCell::new(None::<u64>)));

        let reader = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                shared.0.wait();
                *shared.1.get()
            })
        };

        // SAFETY:
        // The reader does not touch the cell until the latch below is set.
        unsafe { shared.1.set(Some(0x8020_0000)) };
        shared.0.set();

        assert_eq!(reader.join().unwrap(), Some(0x8020_0000));
    }
}
