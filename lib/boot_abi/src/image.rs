//! Descriptors produced by the image loader.

/// Location of a loaded ELF image.
///
/// This layout is shared with the image loader, which fills it in place.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct ImageInfo {
    /// The first physical address occupied by the image.
    pub phys_region_start: usize,
    /// The physical address one past the end of the image.
    pub phys_region_end: usize,
    /// The first virtual address the image is linked at.
    pub virt_region_start: usize,
    /// The virtual address one past the end of the image.
    pub virt_region_end: usize,
    /// The virtual address of the image's entry point.
    pub virt_entry: usize,
    /// The value that, added to a virtual address inside the image, produces the physical address
    /// backing it. Wraps on underflow: images linked above their load address store the two's
    /// complement of the distance.
    pub phys_virt_offset: usize,
}

impl ImageInfo {
    /// An [`ImageInfo`] describing no image.
    pub const EMPTY: Self = Self {
        phys_region_start: 0,
        phys_region_end: 0,
        virt_region_start: 0,
        virt_region_end: 0,
        virt_entry: 0,
        phys_virt_offset: 0,
    };
}

/// The platform description handed to the kernel, usually a flattened device tree.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct PlatformDescriptor {
    /// The physical address of the descriptor, or `0` if there is none.
    pub address: usize,
    /// The size, in bytes, of the descriptor.
    pub size: usize,
}

impl PlatformDescriptor {
    /// The [`PlatformDescriptor`] passed when the platform provides none.
    pub const NONE: Self = Self {
        address: 0,
        size: 0,
    };
}
