//! The terminal state for unrecoverable errors.

use core::fmt;

use crate::{logging::HALT_TARGET, platform::Platform};

/// Reports `reason` and stops the calling core for good.
///
/// No cleanup is attempted. The wait is repeated forever because a core may be woken spuriously.
/// The report is skipped if the console stays busy, which covers a core that faulted while
/// holding it.
pub fn halt<P: Platform + ?Sized>(platform: &P, reason: &dyn fmt::Display) -> ! {
    log::error!(target: HALT_TARGET, "{reason}");
    log::error!(target: HALT_TARGET, "HALT: the loader cannot continue");

    loop {
        platform.wait_for_interrupt();
    }
}
