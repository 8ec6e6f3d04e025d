//! Starting the secondary cores from the primary core.

use boot_abi::{CoreId, CoreIdentity, HartId};

use crate::{
    barrier::BarrierError,
    episode::{BootEpisode, HandoffInfo, PublishError},
    platform::{Platform, SecondaryEntry},
};

/// Releases and starts every secondary core, then joins the readiness barrier as
/// [`CoreId::PRIMARY`].
///
/// The go signal is published before any core is started. Every hardware id from `1` through
/// `CORES` other than `own` is started at `entry` with its own id as the argument. A core that
/// fails to start is only reported: it will never register, so this function then never returns.
///
/// # Errors
///
/// - [`BringupError::Publish`]: the episode had already been published.
/// - [`BringupError::Barrier`]: the primary core could not register with the barrier.
pub fn start_secondaries<P: Platform + ?Sized, const CORES: usize>(
    episode: &BootEpisode<CORES>,
    platform: &P,
    own: HartId,
    info: HandoffInfo,
    entry: SecondaryEntry,
) -> Result<(), BringupError> {
    episode.publish(info)?;

    if platform.hart_start_supported() {
        for hart in (1..=CORES).map(HartId).filter(|&hart| hart != own) {
            match platform.start_hart(hart, entry, hart.0) {
                Ok(()) => log::debug!("started hart {hart} at {:#x}", entry.address()),
                Err(error) => log::warn!("failed to start hart {hart}: {error}"),
            }
        }
    } else {
        log::debug!("harts cannot be started individually, relying on harts released at reset");
    }

    episode.barrier().register_and_wait(CoreIdentity {
        hart: own,
        core: CoreId::PRIMARY,
    })?;

    Ok(())
}

/// Various errors that can occur while bringing up the secondary cores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BringupError {
    /// The go signal could not be published.
    #[error(transparent)]
    Publish(#[from] PublishError),
    /// The primary core could not join the barrier.
    #[error(transparent)]
    Barrier(#[from] BarrierError),
}
