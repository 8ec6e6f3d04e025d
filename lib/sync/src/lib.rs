//! Synchronization primitives usable before any scheduler exists.
//!
//! Everything in here is built directly on atomics and busy-waiting: at the point these are used
//! there is no operating system to block on, only cores spinning on shared memory.

#![no_std]

#[cfg(test)]
extern crate std;

mod controlled_modification;
mod latch;
mod spinlock;

pub use controlled_modification::ControlledModificationCell;
pub use latch::Latch;
pub use spinlock::{RawSpinlock, Spinlock, SpinlockGuard};
