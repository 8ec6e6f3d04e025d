//! A write-once flag that releases every core waiting on it.

use core::sync::atomic::{AtomicBool, Ordering};

/// A boolean that goes from unset to set exactly once and never back.
///
/// [`Latch::set()`] is a release store and every observation of the set state is an acquire
/// load, so anything the setting core wrote before [`Latch::set()`] is visible to a core once
/// [`Latch::is_set()`] or [`Latch::wait()`] reports the latch as set.
#[derive(Debug)]
pub struct Latch {
    /// Whether the latch has been set.
    set: AtomicBool,
}

impl Latch {
    /// Creates a new unset [`Latch`].
    pub const fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
        }
    }

    /// Sets the [`Latch`]. Setting an already set latch has no further effect.
    pub fn set(&self) {
        self.set.store(true, Ordering::Release);
    }

    /// Returns `true` if the [`Latch`] has been set.
    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    /// Spins until the [`Latch`] is set.
    ///
    /// There is no timeout: if nothing ever sets the latch, this never returns.
    pub fn wait(&self) {
        while !self.is_set() {
            core::hint::spin_loop();
        }
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}
