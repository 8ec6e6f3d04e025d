//! # The Kernel Handoff ABI
//!
//! This crate serves as the contract between the loader and the kernel it starts, and between the
//! loader and the image loader that unpacks the kernel and user images before handoff.
//!
//! ## General Notes
//!
//! The kernel is entered by a plain call through its entry address using the platform's C calling
//! convention. All arguments are machine words and are passed positionally:
//!
//! | index | value                                       |
//! |-------|---------------------------------------------|
//! | 0     | user image physical region start            |
//! | 1     | user image physical region end              |
//! | 2     | user image physical-to-virtual offset       |
//! | 3     | user image virtual entry address            |
//! | 4     | platform descriptor (device tree) address   |
//! | 5     | platform descriptor (device tree) size      |
//! | 6     | hardware id of the entering core            |
//! | 7     | logical id of the entering core             |
//!
//! Arguments 6 and 7 are only passed when the loader was configured for more than one core. A
//! single-core loader passes exactly the first six. The kernel must be built with the matching
//! configuration; nothing in the call itself distinguishes the two.
//!
//! The kernel never returns. A return is a violation of this contract.
#![no_std]

#[cfg(test)]
extern crate std;

mod entry;
mod ids;
mod image;

pub use entry::{
    BootParameters, KernelArguments, KernelEntry, MULTIPROCESSOR_ARGUMENT_COUNT,
    MultiprocessorEntry, UNIPROCESSOR_ARGUMENT_COUNT, UniprocessorEntry,
};
pub use ids::{CoreId, CoreIdentity, HartId};
pub use image::{ImageInfo, PlatformDescriptor};
