//! The argument list passed to the kernel and the call that passes it.

use core::{mem, ptr};

use crate::{CoreIdentity, ImageInfo, PlatformDescriptor};

/// The number of arguments passed to a kernel configured for a single core.
pub const UNIPROCESSOR_ARGUMENT_COUNT: usize = 6;
/// The number of arguments passed to a kernel configured for more than one core.
pub const MULTIPROCESSOR_ARGUMENT_COUNT: usize = UNIPROCESSOR_ARGUMENT_COUNT + 2;

/// Signature of the kernel entry point on a single-core configuration.
pub type UniprocessorEntry = unsafe extern "C" fn(
    user_phys_start: usize,
    user_phys_end: usize,
    user_phys_virt_offset: usize,
    user_virt_entry: usize,
    descriptor_address: usize,
    descriptor_size: usize,
);

/// Signature of the kernel entry point on a multi-core configuration.
pub type MultiprocessorEntry = unsafe extern "C" fn(
    user_phys_start: usize,
    user_phys_end: usize,
    user_phys_virt_offset: usize,
    user_virt_entry: usize,
    descriptor_address: usize,
    descriptor_size: usize,
    hart_id: usize,
    core_id: usize,
);

/// The values a core hands to the kernel.
///
/// All cores of a boot share everything but [`BootParameters::identity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootParameters {
    /// The user (root task) image.
    pub user: ImageInfo,
    /// The platform description passed through to the kernel.
    pub descriptor: PlatformDescriptor,
    /// The identity of the entering core. [`None`] on a single-core configuration.
    pub identity: Option<CoreIdentity>,
}

impl BootParameters {
    /// Lays out the [`BootParameters`] in kernel argument order.
    pub const fn arguments(&self) -> KernelArguments {
        let user = &self.user;
        let descriptor = &self.descriptor;

        match self.identity {
            None => KernelArguments::Uniprocessor([
                user.phys_region_start,
                user.phys_region_end,
                user.phys_virt_offset,
                user.virt_entry,
                descriptor.address,
                descriptor.size,
            ]),
            Some(identity) => KernelArguments::Multiprocessor([
                user.phys_region_start,
                user.phys_region_end,
                user.phys_virt_offset,
                user.virt_entry,
                descriptor.address,
                descriptor.size,
                identity.hart.0,
                identity.core.0,
            ]),
        }
    }
}

/// The positional argument list of a kernel entry call.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum KernelArguments {
    /// Arguments for a kernel configured for a single core.
    Uniprocessor([usize; UNIPROCESSOR_ARGUMENT_COUNT]),
    /// Arguments for a kernel configured for more than one core.
    Multiprocessor([usize; MULTIPROCESSOR_ARGUMENT_COUNT]),
}

impl KernelArguments {
    /// Returns the arguments in the order they are passed.
    pub const fn as_slice(&self) -> &[usize] {
        match self {
            Self::Uniprocessor(arguments) => arguments,
            Self::Multiprocessor(arguments) => arguments,
        }
    }
}

/// The address at which the kernel is entered.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct KernelEntry(usize);

impl KernelEntry {
    /// Creates a [`KernelEntry`] for code located at `address`.
    pub const fn new(address: usize) -> Self {
        Self(address)
    }

    /// Returns the address of the [`KernelEntry`].
    pub const fn address(self) -> usize {
        self.0
    }

    /// Calls the code at this [`KernelEntry`] with `arguments`.
    ///
    /// Under the handoff contract this never returns. If it does, the callee broke the contract
    /// and the caller is responsible for treating that as fatal.
    ///
    /// # Safety
    ///
    /// - The address must be the start of executable code in the current address space.
    /// - That code must follow the C calling convention and accept exactly as many word-sized
    ///   arguments as `arguments` holds.
    pub unsafe fn call(self, arguments: &KernelArguments) {
        let entry = ptr::with_exposed_provenance::<()>(self.0);

        match *arguments {
            KernelArguments::Uniprocessor([a0, a1, a2, a3, a4, a5]) => {
                // SAFETY:
                // The caller guarantees that `entry` points to a function with this signature.
                let entry = unsafe { mem::transmute::<*const (), UniprocessorEntry>(entry) };

                // SAFETY:
                // The caller guarantees that calling the kernel with these arguments is valid.
                unsafe { entry(a0, a1, a2, a3, a4, a5) }
            }
            KernelArguments::Multiprocessor([a0, a1, a2, a3, a4, a5, a6, a7]) => {
                // SAFETY:
                // The caller guarantees that `entry` points to a function with this signature.
                let entry = unsafe { mem::transmute::<*const (), MultiprocessorEntry>(entry) };

                // SAFETY:
                // The caller guarantees that calling the kernel with these arguments is valid.
                unsafe { entry(a0, a1, a2, a3, a4, a5, a6, a7) }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Mutex, vec::Vec};

    use super::{BootParameters, KernelArguments, KernelEntry};
    use crate::{CoreId, CoreIdentity, HartId, ImageInfo, PlatformDescriptor};

    fn parameters(identity: Option<CoreIdentity>) -> BootParameters {
        BootParameters {
            user: ImageInfo {
                phys_region_start: 0x1000,
                phys_region_end: 0x2000,
                virt_region_start: 0x40_0000,
                virt_region_end: 0x40_1000,
                virt_entry: 0x40_0100,
                phys_virt_offset: 0x3000,
            },
            descriptor: PlatformDescriptor {
                address: 0x8200_0000,
                size: 0x1F00,
            },
            identity,
        }
    }

    #[test]
    fn single_core_arguments_omit_identity() {
        let arguments = parameters(None).arguments();

        assert_eq!(arguments.as_slice().len(), 6);
        assert_eq!(
            arguments.as_slice(),
            &[0x1000, 0x2000, 0x3000, 0x40_0100, 0x8200_0000, 0x1F00]
        );
    }

    #[test]
    fn multi_core_arguments_end_with_identity() {
        let identity = CoreIdentity {
            hart: HartId(3),
            core: CoreId(2),
        };
        let arguments = parameters(Some(identity)).arguments();

        assert!(matches!(arguments, KernelArguments::Multiprocessor(_)));
        assert_eq!(
            arguments.as_slice(),
            &[0x1000, 0x2000, 0x3000, 0x40_0100, 0x8200_0000, 0x1F00, 3, 2]
        );
    }

    static UNIPROCESSOR_CALLS: Mutex<Vec<[usize; 6]>> = Mutex::new(Vec::new());

    extern "C" fn record_uniprocessor(
        a0: usize,
        a1: usize,
        a2: usize,
        a3: usize,
        a4: usize,
        a5: usize,
    ) {
        UNIPROCESSOR_CALLS
            .lock()
            .unwrap()
            .push([a0, a1, a2, a3, a4, a5]);
    }

    static MULTIPROCESSOR_CALLS: Mutex<Vec<[usize; 8]>> = Mutex::new(Vec::new());

    #[allow(clippy::too_many_arguments)]
    extern "C" fn record_multiprocessor(
        a0: usize,
        a1: usize,
        a2: usize,
        a3: usize,
        a4: usize,
        a5: usize,
        a6: usize,
        a7: usize,
    ) {
        MULTIPROCESSOR_CALLS
            .lock()
            .unwrap()
            .push([a0, a1, a2, a3, a4, a5, a6, a7]);
    }

    #[test]
    fn call_passes_uniprocessor_arguments_in_register_order() {
        let entry = KernelEntry::new((record_uniprocessor as *const ()).expose_provenance());
        let arguments = parameters(None).arguments();

        // SAFETY:
        // `record_uniprocessor` is a C ABI function taking six words.
        unsafe { entry.call(&arguments) };

        assert_eq!(
            UNIPROCESSOR_CALLS.lock().unwrap().as_slice(),
            &[[0x1000, 0x2000, 0x3000, 0x40_0100, 0x8200_0000, 0x1F00]]
        );
    }

    #[test]
    fn call_passes_multiprocessor_arguments_in_register_order() {
        let entry = KernelEntry::new((record_multiprocessor as *const ()).expose_provenance());
        let identity = CoreIdentity {
            hart: HartId(1),
            core: CoreId(0),
        };
        let arguments = parameters(Some(identity)).arguments();

        // SAFETY:
        // `record_multiprocessor` is a C ABI function taking eight words.
        unsafe { entry.call(&arguments) };

        assert_eq!(
            MULTIPROCESSOR_CALLS.lock().unwrap().as_slice(),
            &[[0x1000, 0x2000, 0x3000, 0x40_0100, 0x8200_0000, 0x1F00, 1, 0]]
        );
    }
}
