//! Exchange-based spinlocks.

use core::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// A single-word lock with no associated data.
///
/// Acquisition is an atomic exchange with [`Ordering::Acquire`] and release is a store with
/// [`Ordering::Release`], so everything written inside one critical section is visible to the
/// next core that acquires the lock.
#[derive(Debug)]
pub struct RawSpinlock {
    /// `true` while some core holds the lock.
    locked: AtomicBool,
}

impl RawSpinlock {
    /// Creates a new [`RawSpinlock`] in the unlocked state.
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Locks the [`RawSpinlock`], spinning until the lock is acquired.
    ///
    /// While the lock is observed to be held, only relaxed loads are issued so that waiting cores
    /// do not keep stealing the cache line from the holder.
    pub fn lock(&self) {
        while self.locked.swap(true, Ordering::Acquire) {
            while self.locked.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
    }

    /// Attempts to lock the [`RawSpinlock`] without spinning.
    ///
    /// Returns `true` if the lock was acquired.
    pub fn try_lock(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    /// Unlocks the [`RawSpinlock`].
    ///
    /// Calling this without holding the lock releases whichever core does hold it.
    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Returns `true` if the lock is currently held by some core.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Runs `f` with the lock held, releasing it afterwards.
    pub fn critical_section<R>(&self, f: impl FnOnce() -> R) -> R {
        /// Releases the lock when dropped, including on unwind.
        struct Release<'a>(&'a RawSpinlock);

        impl Drop for Release<'_> {
            fn drop(&mut self) {
                self.0.unlock();
            }
        }

        self.lock();
        let _release = Release(self);
        f()
    }
}

impl Default for RawSpinlock {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`RawSpinlock`] protecting a value.
pub struct Spinlock<T: ?Sized> {
    /// The lock.
    lock: RawSpinlock,
    /// The value protected by the [`Spinlock`].
    value: UnsafeCell<T>,
}

// SAFETY:
// Nothing about `Spinlock<T>` changes whether it is safe to send `T` across threads.
unsafe impl<T: ?Sized + Send> Send for Spinlock<T> {}

// SAFETY:
// Access to `T` is serialized by `lock`, so sharing the `Spinlock` only ever hands `T` to one
// thread at a time, which is sound when `T` can be sent.
unsafe impl<T: ?Sized + Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    /// Creates a new unlocked [`Spinlock`] protecting `value`.
    pub const fn new(value: T) -> Self {
        Self {
            lock: RawSpinlock::new(),
            value: UnsafeCell::new(value),
        }
    }

    /// Consumes this [`Spinlock`], returning the protected value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: ?Sized> Spinlock<T> {
    /// Spins until the lock is acquired and returns a guard granting access to the value.
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        self.lock.lock();

        SpinlockGuard {
            lock: &self.lock,
            value: &self.value,
        }
    }

    /// Acquires the lock if it is free, returning a guard granting access to the value.
    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        // The guard must only be built on success: dropping it releases the lock.
        self.lock.try_lock().then(|| SpinlockGuard {
            lock: &self.lock,
            value: &self.value,
        })
    }
}

/// Grants exclusive access to the value of a [`Spinlock`] until dropped.
#[must_use = "lock guard must be held to access protected data"]
pub struct SpinlockGuard<'a, T: ?Sized> {
    /// The [`RawSpinlock`] guarding [`SpinlockGuard::value`].
    lock: &'a RawSpinlock,
    /// The value to which this [`SpinlockGuard`] provides access.
    value: &'a UnsafeCell<T>,
}

impl<T: ?Sized> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY:
        // The guard only exists while `lock` is held, so no other reference to the value exists.
        unsafe { &*self.value.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinlockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY:
        // The guard only exists while `lock` is held, so no other reference to the value exists.
        unsafe { &mut *self.value.get() }
    }
}

impl<T: ?Sized> Drop for SpinlockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
