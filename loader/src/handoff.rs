//! Transfer of control from the loader to the kernel.

use boot_abi::{BootParameters, KernelEntry};

use crate::{boot::FatalError, halt::halt, platform::Platform};

/// Enters the kernel at `entry` with the argument list built from `parameters`.
///
/// Six arguments are passed when `parameters` carries no core identity and eight when it does.
/// If the kernel ever returns, the calling core halts.
///
/// # Safety
///
/// `entry` must be the entry point of a loaded kernel, valid in the calling core's current
/// address space, and the kernel must have been built for the same number of cores as the
/// argument list implies.
pub unsafe fn handoff<P: Platform + ?Sized>(
    platform: &P,
    entry: KernelEntry,
    parameters: &BootParameters,
) -> ! {
    let arguments = parameters.arguments();
    log::trace!(
        "entering kernel at {:#x} with {:x?}",
        entry.address(),
        arguments.as_slice()
    );

    // SAFETY:
    // The caller guarantees that `entry` is a kernel entry point matching `arguments`.
    unsafe { platform.enter_kernel(entry, &arguments) };

    halt(platform, &FatalError::KernelReturned)
}
