//! The loader on RISC-V harts running under SBI firmware.

use core::{
    ffi::{c_int, c_uint, c_void},
    ops::Range,
    panic::PanicInfo,
    ptr,
    sync::atomic::AtomicU32,
};

use boot_abi::{HartId, ImageInfo, KernelArguments, KernelEntry, PlatformDescriptor};
use log::LevelFilter;

use crate::{
    boot::{primary_main, secondary_main},
    config::{MAX_CORES, STACK_SIZE},
    episode::BootEpisode,
    halt::halt,
    logging::{self, ConsoleLogger},
    platform::{LoadedImages, LoaderStatus, Platform, SecondaryEntry, StartError},
};

mod console;
mod sbi;

use console::Console;

/// The boot episode shared by every hart.
///
/// Harts released at reset poll it before the primary has cleared `.bss`, so it must be
/// initialized by the image itself.
#[unsafe(link_section = ".data.boot")]
static EPISODE: BootEpisode<MAX_CORES> = BootEpisode::new();

/// Incremented by every hart passing `_start`. The hart that finds it at zero is the primary.
#[unsafe(link_section = ".data.boot")]
static BOOT_LOTTERY: AtomicU32 = AtomicU32::new(0);

/// The loader's logger.
static LOGGER: ConsoleLogger<Console> = ConsoleLogger::new(Console, LOG_LEVEL);

/// The most verbose level written to the console.
const LOG_LEVEL: LevelFilter = if cfg!(debug_assertions) {
    LevelFilter::Debug
} else {
    LevelFilter::Info
};

/// Stack memory for every hart.
///
/// Slot 0 belongs to the primary. Hart `h` uses slot `h + 1`, so hart ids up to [`MAX_CORES`]
/// have a stack.
#[repr(C, align(16))]
struct Stacks([u8; STACK_SIZE * (MAX_CORES + 2)]);

/// Never cleared, since secondary harts may already be running on their slot while the primary
/// clears `.bss`.
#[unsafe(link_section = ".bss.stack")]
static mut STACKS: Stacks = Stacks([0; STACK_SIZE * (MAX_CORES + 2)]);

unsafe extern "C" {
    /// Brings up the UART and any other device the loader uses.
    fn initialise_devices();

    /// Unpacks the kernel and user images from the boot archive.
    fn load_images(
        kernel_info: *mut ImageInfo,
        user_info: *mut ImageInfo,
        max_user_images: c_uint,
        num_images: *mut c_uint,
        bootloader_dtb: *const c_void,
        chosen_dtb: *mut *const c_void,
        chosen_dtb_size: *mut usize,
    ) -> c_int;

    /// Installs the boot page tables on the calling hart and turns translation on.
    fn enable_virtual_memory();

    /// Start of the loader image.
    static _text: u8;
    /// End of the loader image.
    static _end: u8;

    /// Where harts started through SBI, and harts that lost the boot lottery, begin.
    fn secondary_harts(hart: usize) -> !;
}

core::arch::global_asm!(
    ".pushsection .text.entry, \"ax\"",
    ".global _start",
    "_start:",
    // a0: hart id, a1: device tree. Both survive until the Rust entry points.
    "   la t0, {lottery}",
    "   li t1, 1",
    "   amoadd.w t1, t1, (t0)",
    "   bnez t1, secondary_harts",
    "   la sp, {stacks}",
    "   li t0, {stack_size}",
    "   add sp, sp, t0",
    "   la t0, __bss_start",
    "   la t1, __bss_end",
    "1: bgeu t0, t1, 2f",
    "   sd zero, 0(t0)",
    "   addi t0, t0, 8",
    "   j 1b",
    "2: call {primary}",
    "",
    ".global secondary_harts",
    "secondary_harts:",
    "   li t0, {max_cores}",
    "   bgtu a0, t0, 4f",
    "   addi t1, a0, 2",
    "   li t0, {stack_size}",
    "   mul t1, t1, t0",
    "   la sp, {stacks}",
    "   add sp, sp, t1",
    "   call {secondary}",
    "4: wfi",
    "   j 4b",
    ".popsection",
    lottery = sym BOOT_LOTTERY,
    stacks = sym STACKS,
    stack_size = const STACK_SIZE,
    max_cores = const MAX_CORES,
    primary = sym primary_entry,
    secondary = sym secondary_entry,
);

/// Rust entry point of the hart that won the boot lottery.
extern "C" fn primary_entry(hart: usize, device_tree: usize) -> ! {
    // Only fails if a logger is already installed.
    let _ = logging::init(&LOGGER, LOG_LEVEL);

    // SAFETY:
    // `secondary_harts` sets up a stack from the hart id in `a0` and calls `secondary_entry()`.
    let entry = unsafe { SecondaryEntry::new(secondary_harts as usize) };

    primary_main(&EPISODE, &Sbi, HartId(hart), device_tree, entry)
}

/// Rust entry point of every other hart with an id no larger than [`MAX_CORES`].
extern "C" fn secondary_entry(hart: usize) -> ! {
    secondary_main(&EPISODE, &Sbi, HartId(hart))
}

/// Handles a panic on any hart by halting it.
pub fn panic(info: &PanicInfo) -> ! {
    halt(&Sbi, info)
}

/// The [`Platform`] of harts running under SBI firmware, with C collaborators for everything the
/// firmware does not do.
#[derive(Clone, Copy, Debug)]
struct Sbi;

// SAFETY:
// `load_images()` reports success only when the C image loader does, and `start_hart()` starts
// harts through the HSM extension exactly as requested.
unsafe impl Platform for Sbi {
    fn initialize_devices(&self) {
        // SAFETY:
        // Only the primary hart calls this, once, before any output.
        unsafe { initialise_devices() }
    }

    fn loader_image(&self) -> Range<usize> {
        (&raw const _text).addr()..(&raw const _end).addr()
    }

    fn load_images(
        &self,
        max_apps: usize,
        boot_blob: usize,
    ) -> Result<LoadedImages, LoaderStatus> {
        let mut kernel = ImageInfo::EMPTY;
        let mut user = ImageInfo::EMPTY;
        let mut app_count: c_uint = 0;
        let mut descriptor = ptr::null::<c_void>();
        let mut descriptor_size = 0;

        // SAFETY:
        // Every output pointer refers to a live local, and `boot_blob` is the device tree the
        // firmware passed in `a1`.
        let status = unsafe {
            load_images(
                &mut kernel,
                &mut user,
                c_uint::try_from(max_apps).unwrap_or(c_uint::MAX),
                &mut app_count,
                ptr::with_exposed_provenance(boot_blob),
                &mut descriptor,
                &mut descriptor_size,
            )
        };
        if status != 0 {
            return Err(LoaderStatus(status));
        }

        Ok(LoadedImages {
            kernel,
            user,
            app_count: app_count as usize,
            descriptor: PlatformDescriptor {
                address: descriptor.expose_provenance(),
                size: descriptor_size,
            },
        })
    }

    fn hart_start_supported(&self) -> bool {
        sbi::probe_extension(sbi::EXTENSION_HSM)
    }

    fn start_hart(
        &self,
        hart: HartId,
        entry: SecondaryEntry,
        argument: usize,
    ) -> Result<(), StartError> {
        // SAFETY:
        // `SecondaryEntry` guarantees a routine that runs with translation disabled and takes
        // the hart id in `a0`, which the HSM extension passes.
        unsafe { sbi::hart_start(hart.0, entry.address(), argument) }
    }

    fn enable_virtual_memory(&self) {
        // SAFETY:
        // The boot page tables were built by `load_images()` before the go signal was set, and
        // the loader itself stays mapped.
        unsafe { enable_virtual_memory() }
    }

    unsafe fn enter_kernel(&self, entry: KernelEntry, arguments: &KernelArguments) {
        // SAFETY:
        // The caller guarantees that `entry` is a kernel entry point expecting `arguments`.
        unsafe { entry.call(arguments) }
    }

    fn wait_for_interrupt(&self) {
        // SAFETY:
        // `wfi` only pauses the hart until an interrupt is pending.
        unsafe { riscv::asm::wfi() }
    }
}
