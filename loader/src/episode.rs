//! The shared state of one boot episode.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use boot_abi::{BootParameters, CoreId, CoreIdentity, ImageInfo, PlatformDescriptor};
use sync::{ControlledModificationCell, Latch};

use crate::barrier::ReadinessBarrier;

/// What every core needs to enter the kernel, fixed once images are loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandoffInfo {
    /// The kernel image.
    pub kernel: ImageInfo,
    /// The user image handed to the kernel.
    pub user: ImageInfo,
    /// The platform description handed to the kernel.
    pub descriptor: PlatformDescriptor,
}

impl HandoffInfo {
    /// A [`HandoffInfo`] describing nothing, used before images are loaded.
    const EMPTY: Self = Self {
        kernel: ImageInfo::EMPTY,
        user: ImageInfo::EMPTY,
        descriptor: PlatformDescriptor::NONE,
    };

    /// Returns the [`BootParameters`] for a core with `identity`.
    ///
    /// `identity` must be [`None`] exactly when the loader is configured for a single core.
    pub const fn parameters(&self, identity: Option<CoreIdentity>) -> BootParameters {
        BootParameters {
            user: self.user,
            descriptor: self.descriptor,
            identity,
        }
    }
}

/// All mutable state shared between the cores of a boot episode.
///
/// A bare-metal build keeps one of these in a `static`; tests create one per simulated boot.
#[derive(Debug)]
pub struct BootEpisode<const CORES: usize> {
    /// Set once the primary core allows the secondaries to proceed.
    go: Latch,
    /// Claimed by the one call to [`BootEpisode::publish()`] that stores [`BootEpisode::handoff`].
    published: AtomicBool,
    /// Written once before [`BootEpisode::go`] is set and only read after it is observed.
    handoff: ControlledModificationCell<HandoffInfo>,
    /// The next logical identifier to hand to a secondary core.
    next_core: AtomicUsize,
    /// The rendezvous before handoff.
    barrier: ReadinessBarrier<CORES>,
}

impl<const CORES: usize> BootEpisode<CORES> {
    /// Creates a [`BootEpisode`] in which nothing has happened yet.
    pub const fn new() -> Self {
        Self {
            go: Latch::new(),
            published: AtomicBool::new(false),
            handoff: ControlledModificationCell::new(HandoffInfo::EMPTY),
            next_core: AtomicUsize::new(1),
            barrier: ReadinessBarrier::new(),
        }
    }

    /// Stores `info` and then sets the go signal, releasing every waiting secondary core.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if this episode was already published. The first publication
    /// stays in effect.
    pub fn publish(&self, info: HandoffInfo) -> Result<(), PublishError> {
        if self
            .published
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(PublishError);
        }

        // SAFETY:
        // Winning the exchange above makes this the only write. Readers only reach the cell after
        // observing `go` with acquire ordering, and `go` is set with release ordering after this
        // write completes.
        unsafe { self.handoff.set(info) };
        self.go.set();

        Ok(())
    }

    /// Returns `true` once the go signal has been set.
    #[cfg(test)]
    pub fn go_published(&self) -> bool {
        self.go.is_set()
    }

    /// Spins until the go signal is set and returns the published [`HandoffInfo`].
    pub fn wait_for_go(&self) -> &HandoffInfo {
        self.go.wait();
        self.handoff.get()
    }

    /// Returns the published [`HandoffInfo`], or [`None`] if the go signal is not set yet.
    #[cfg(test)]
    pub fn handoff_info(&self) -> Option<&HandoffInfo> {
        self.go.is_set().then(|| self.handoff.get())
    }

    /// Assigns the next logical identifier to an arriving secondary core.
    ///
    /// Returns [`None`] once all `CORES - 1` secondary identifiers have been handed out.
    pub fn assign_core_id(&self) -> Option<CoreId> {
        self.next_core
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                (next < CORES).then_some(next + 1)
            })
            .ok()
            .map(CoreId)
    }

    /// Returns the readiness barrier of this episode.
    pub fn barrier(&self) -> &ReadinessBarrier<CORES> {
        &self.barrier
    }

    /// Runs `f` while holding the barrier lock, so its output does not interleave with other
    /// cores' boot diagnostics.
    pub fn serialized<R>(&self, f: impl FnOnce() -> R) -> R {
        self.barrier.lock().critical_section(f)
    }
}

impl<const CORES: usize> Default for BootEpisode<CORES> {
    fn default() -> Self {
        Self::new()
    }
}

/// The error returned when a [`BootEpisode`] is published more than once.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, thiserror::Error)]
#[error("boot episode was already published")]
pub struct PublishError;
