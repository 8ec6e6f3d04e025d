//! The interface platform implementors provide to the boot core.
//!
//! Everything the boot core cannot do by itself (bringing up the console, unpacking images,
//! starting cores, switching address translation on, jumping into the kernel) is reached through
//! [`Platform`].

use core::{fmt, ops::Range};

use boot_abi::{HartId, ImageInfo, KernelArguments, KernelEntry, PlatformDescriptor};

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
mod riscv64;

#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub use riscv64::panic;

/// Operations the boot core needs from the platform it runs on.
///
/// # Safety
///
/// - [`Platform::load_images()`] must only report success once both images are fully present in
///   memory at the locations described, so that entering the kernel image is valid.
/// - [`Platform::start_hart()`] must begin execution of `hart` at `entry` with `argument` as its
///   first argument, or fail without starting it.
pub unsafe trait Platform {
    /// Brings up the console and any other device needed before the first diagnostic.
    fn initialize_devices(&self);

    /// Returns the physical memory occupied by the loader itself.
    fn loader_image(&self) -> Range<usize>;

    /// Unpacks the kernel image and at most `max_apps` user images found in `boot_blob`.
    ///
    /// # Errors
    ///
    /// Returns the loader's non-zero status code if loading failed.
    fn load_images(&self, max_apps: usize, boot_blob: usize) -> Result<LoadedImages, LoaderStatus>;

    /// Returns `true` if [`Platform::start_hart()`] can start individual cores.
    ///
    /// When it cannot, every core was released by the firmware at reset and the secondaries are
    /// already waiting for the go signal.
    fn hart_start_supported(&self) -> bool;

    /// Starts `hart` at `entry`, passing `argument`.
    ///
    /// # Errors
    ///
    /// Returns [`StartError`] if the core could not be started.
    fn start_hart(
        &self,
        hart: HartId,
        entry: SecondaryEntry,
        argument: usize,
    ) -> Result<(), StartError>;

    /// Performs the core-local setup a secondary core needs before it can enter the kernel at
    /// its virtual entry point. Must be idempotent.
    fn enable_virtual_memory(&self);

    /// Transfers control to `entry`, passing `arguments`.
    ///
    /// This only returns if the kernel broke the handoff contract.
    ///
    /// # Safety
    ///
    /// `entry` must be the entry point of a kernel loaded by [`Platform::load_images()`] that is
    /// valid in the calling core's current address space. It must expect as many arguments as
    /// `arguments` holds.
    unsafe fn enter_kernel(&self, entry: KernelEntry, arguments: &KernelArguments);

    /// Waits in a low-power state until something wakes the calling core. May return spuriously.
    fn wait_for_interrupt(&self);
}

/// The result of a successful [`Platform::load_images()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadedImages {
    /// The kernel image.
    pub kernel: ImageInfo,
    /// The user image. Only meaningful if [`LoadedImages::app_count`] is at least one.
    pub user: ImageInfo,
    /// The number of user images the loader found.
    pub app_count: usize,
    /// The platform description to pass to the kernel.
    pub descriptor: PlatformDescriptor,
}

/// The non-zero status code reported by a failed [`Platform::load_images()`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct LoaderStatus(pub i32);

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The address at which secondary cores begin execution.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SecondaryEntry(usize);

impl SecondaryEntry {
    /// Creates a [`SecondaryEntry`] for the routine at `address`.
    ///
    /// # Safety
    ///
    /// `address` must be the start of a routine that takes the hardware identifier of the
    /// calling core as its first argument, sets up a stack and runs the secondary boot path.
    pub const unsafe fn new(address: usize) -> Self {
        Self(address)
    }

    /// Returns the address of the entry routine.
    pub const fn address(self) -> usize {
        self.0
    }
}

/// Various errors that can occur while starting a core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// No core with the requested identifier exists.
    #[error("no such hart")]
    NoSuchHart,
    /// The core is already running.
    #[error("hart already started")]
    AlreadyStarted,
    /// The platform does not allow starting cores at the given entry.
    #[error("entry address rejected")]
    InvalidEntry,
    /// The platform reported an error this interface does not model.
    #[error("platform error {0}")]
    Other(isize),
}
