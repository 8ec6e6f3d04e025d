//! The rendezvous every core passes through before entering the kernel.

use core::sync::atomic::{AtomicBool, Ordering};

use boot_abi::{CoreId, CoreIdentity};
use sync::RawSpinlock;

/// Tracks which of `CORES` cores have reached the rendezvous.
///
/// Registration is serialized by a lock because the slot write and its diagnostic belong
/// together. Waiting takes no lock at all: each slot has a single writer and only ever goes from
/// `false` to `true`, so relaxed polling cannot observe a slot going back.
///
/// There is no timeout. A core that never registers keeps every other core waiting forever.
#[derive(Debug)]
pub struct ReadinessBarrier<const CORES: usize> {
    /// Serializes registration and the diagnostics printed alongside it.
    lock: RawSpinlock,
    /// One slot per [`CoreId`], set when that core arrives.
    ready: [AtomicBool; CORES],
}

impl<const CORES: usize> ReadinessBarrier<CORES> {
    /// Creates a [`ReadinessBarrier`] with no core registered.
    pub const fn new() -> Self {
        const { assert!(CORES >= 1, "a boot episode needs at least one core") };

        Self {
            lock: RawSpinlock::new(),
            ready: [const { AtomicBool::new(false) }; CORES],
        }
    }

    /// Returns the lock guarding registration.
    ///
    /// Other diagnostics that must not interleave with registration take the same lock.
    pub fn lock(&self) -> &RawSpinlock {
        &self.lock
    }

    /// Records that the core described by `identity` reached the rendezvous.
    ///
    /// Registering the same core again leaves the barrier unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::UnexpectedCore`] if `identity.core` has no slot.
    pub fn register(&self, identity: CoreIdentity) -> Result<(), BarrierError> {
        let Some(slot) = self.ready.get(identity.core.0) else {
            return Err(BarrierError::UnexpectedCore {
                core: identity.core,
                cores: CORES,
            });
        };

        self.lock.critical_section(|| {
            log::info!("Hart ID {} core ID {}", identity.hart, identity.core);
            slot.store(true, Ordering::Relaxed);
        });

        Ok(())
    }

    /// Spins until every core has registered.
    pub fn wait_for_all(&self) {
        for slot in &self.ready {
            while !slot.load(Ordering::Relaxed) {
                core::hint::spin_loop();
            }
        }
    }

    /// Registers the calling core and waits until every other core has done the same.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierError::UnexpectedCore`] if `identity.core` has no slot. The caller has not
    /// been registered in that case.
    pub fn register_and_wait(&self, identity: CoreIdentity) -> Result<(), BarrierError> {
        self.register(identity)?;
        self.wait_for_all();

        Ok(())
    }

    /// Returns `true` if `core` has registered.
    #[cfg(test)]
    pub fn is_ready(&self, core: CoreId) -> bool {
        self.ready
            .get(core.0)
            .is_some_and(|slot| slot.load(Ordering::Relaxed))
    }

    /// Returns the number of cores that have registered so far.
    #[cfg(test)]
    pub fn arrived(&self) -> usize {
        self.ready
            .iter()
            .filter(|slot| slot.load(Ordering::Relaxed))
            .count()
    }

    /// Returns `true` once every core has registered.
    #[cfg(test)]
    pub fn all_ready(&self) -> bool {
        self.arrived() == CORES
    }
}

impl<const CORES: usize> Default for ReadinessBarrier<CORES> {
    fn default() -> Self {
        Self::new()
    }
}

/// Various errors that can occur while using a [`ReadinessBarrier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    /// A core tried to register with an identifier outside of the barrier.
    #[error("core {core} is not one of the {cores} expected cores")]
    UnexpectedCore {
        /// The identifier that was rejected.
        core: CoreId,
        /// The number of cores the barrier waits for.
        cores: usize,
    },
}
