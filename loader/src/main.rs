//! The final stage of a multi-core loader: brings every core to a common rendezvous and hands
//! control to the freshly loaded kernel.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

pub mod barrier;
pub mod boot;
pub mod bringup;
pub mod config;
pub mod episode;
pub mod halt;
pub mod handoff;
pub mod logging;
pub mod platform;

#[cfg(test)]
mod testing;

/// Generic handler for panics.
///
/// A panic is just another fatal condition, so it ends the same way as every other one.
#[panic_handler]
#[cfg(all(not(test), target_arch = "riscv64", target_os = "none"))]
fn panic_handler(info: &core::panic::PanicInfo) -> ! {
    platform::panic(info)
}
