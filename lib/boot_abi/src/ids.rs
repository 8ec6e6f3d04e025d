//! Identifiers of the cores taking part in a boot.

use core::fmt;

/// The identifier the hardware (or firmware) uses for a core.
///
/// On RISC-V this is the hart id found in `mhartid`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct HartId(pub usize);

impl fmt::Display for HartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The dense, zero-based identifier the loader assigns to a core.
///
/// The primary core is always [`CoreId::PRIMARY`]. Secondary cores receive `1`, `2`, ... in the
/// order in which they arrive.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoreId(pub usize);

impl CoreId {
    /// The [`CoreId`] of the core that loaded the images.
    pub const PRIMARY: Self = Self(0);
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The pair of identifiers a core passes to the kernel on a multi-core configuration.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct CoreIdentity {
    /// The hardware identifier of the core.
    pub hart: HartId,
    /// The logical identifier assigned by the loader.
    pub core: CoreId,
}
