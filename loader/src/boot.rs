//! The boot paths of the primary and the secondary cores.

use boot_abi::{BootParameters, CoreId, CoreIdentity, HartId, KernelEntry};

use crate::{
    barrier::BarrierError,
    bringup::{BringupError, start_secondaries},
    config::MAX_APPS,
    episode::{BootEpisode, HandoffInfo},
    halt::halt,
    handoff::handoff,
    platform::{LoaderStatus, Platform, SecondaryEntry},
};

/// Runs the boot path of the core chosen to load the images, ending in the kernel.
///
/// `secondary_entry` is where started secondary cores begin executing; it must eventually call
/// [`secondary_main()`] with the same `episode`.
pub fn primary_main<P: Platform + ?Sized, const CORES: usize>(
    episode: &BootEpisode<CORES>,
    platform: &P,
    hart: HartId,
    boot_blob: usize,
    secondary_entry: SecondaryEntry,
) -> ! {
    platform.initialize_devices();

    let loader = platform.loader_image();
    log::info!("loader started on (HART {hart}) (NODES {CORES})");
    log::info!(
        "  paddr=[{:#x}..{:#x}]",
        loader.start,
        loader.end.wrapping_sub(1)
    );

    match prepare_primary(episode, platform, hart, boot_blob, secondary_entry) {
        // SAFETY:
        // `prepare_primary()` returns the physical entry point of the kernel that the platform
        // reported as loaded, and address translation is still disabled on this core.
        Ok((entry, parameters)) => unsafe { handoff(platform, entry, &parameters) },
        Err(error) => halt(platform, &error),
    }
}

/// Loads the images, releases the secondary cores and waits for them at the barrier.
///
/// Returns the physical kernel entry point and the parameters of the primary core.
fn prepare_primary<P: Platform + ?Sized, const CORES: usize>(
    episode: &BootEpisode<CORES>,
    platform: &P,
    hart: HartId,
    boot_blob: usize,
    secondary_entry: SecondaryEntry,
) -> Result<(KernelEntry, BootParameters), FatalError> {
    let images = platform
        .load_images(MAX_APPS, boot_blob)
        .map_err(FatalError::Load)?;
    if images.app_count != MAX_APPS {
        return Err(FatalError::AppCount(images.app_count));
    }

    let info = HandoffInfo {
        kernel: images.kernel,
        user: images.user,
        descriptor: images.descriptor,
    };

    let identity = if CORES > 1 {
        episode.serialized(|| log::info!("Main entry hart_id:{hart}"));
        start_secondaries(episode, platform, hart, info, secondary_entry)?;

        Some(CoreIdentity {
            hart,
            core: CoreId::PRIMARY,
        })
    } else {
        None
    };

    log::info!("Jumping to kernel-image entry point...");
    log::info!("kernel_phys_region_start: {:#x}", info.kernel.phys_region_start);
    log::info!("kernel_phys_region_end: {:#x}", info.kernel.phys_region_end);
    log::info!("kernel_phys_virt_offset: {:#x}", info.kernel.phys_virt_offset);
    log::info!("kernel_virt_entry: {:#x}", info.kernel.virt_entry);

    Ok((
        KernelEntry::new(info.kernel.phys_region_start),
        info.parameters(identity),
    ))
}

/// Runs the boot path of every core other than the primary, ending in the kernel.
///
/// The core waits for the primary's go signal before touching anything shared.
pub fn secondary_main<P: Platform + ?Sized, const CORES: usize>(
    episode: &BootEpisode<CORES>,
    platform: &P,
    hart: HartId,
) -> ! {
    let info = episode.wait_for_go();

    match join_barrier(episode, hart) {
        Ok(identity) => {
            platform.enable_virtual_memory();

            let parameters = info.parameters(Some(identity));
            // SAFETY:
            // The go signal guarantees that the primary loaded the kernel described by `info`,
            // and virtual memory is now enabled, so its virtual entry point is mapped.
            unsafe {
                handoff(
                    platform,
                    KernelEntry::new(info.kernel.virt_entry),
                    &parameters,
                )
            }
        }
        Err(error) => halt(platform, &error),
    }
}

/// Takes a logical identifier for `hart` and waits at the barrier with it.
fn join_barrier<const CORES: usize>(
    episode: &BootEpisode<CORES>,
    hart: HartId,
) -> Result<CoreIdentity, FatalError> {
    let core = episode
        .assign_core_id()
        .ok_or(FatalError::NoCoreId { hart, cores: CORES })?;
    let identity = CoreIdentity { hart, core };

    episode.serialized(|| log::info!("Secondary entry hart_id:{hart} core_id:{core}"));
    episode.barrier().register_and_wait(identity)?;

    Ok(identity)
}

/// Various conditions that stop a core from reaching the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    /// The platform failed to load the images.
    #[error("image loading failed, code {0}")]
    Load(LoaderStatus),
    /// The platform loaded a number of user images other than the one the kernel expects.
    #[error("expected to load just 1 app, actually loaded {0} apps")]
    AppCount(usize),
    /// The kernel entry point returned to the loader.
    #[error("kernel returned back to the loader")]
    KernelReturned,
    /// More cores arrived than the loader was configured for.
    #[error("hart {hart} has no core ID left, the loader is configured for {cores} cores")]
    NoCoreId {
        /// The hardware identifier of the core that was turned away.
        hart: HartId,
        /// The number of cores the loader is configured for.
        cores: usize,
    },
    /// The secondary cores could not be brought up.
    #[error("error bringing up secondary cores: {0}")]
    Bringup(#[from] BringupError),
    /// A core could not join the barrier.
    #[error("error joining the barrier: {0}")]
    Barrier(#[from] BarrierError),
}
