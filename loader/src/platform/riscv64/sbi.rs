//! Calls into the Supervisor Binary Interface firmware.

use crate::platform::StartError;

/// The base extension, always present.
const EXTENSION_BASE: usize = 0x10;
/// Function of [`EXTENSION_BASE`] reporting whether an extension is available.
const BASE_PROBE_EXTENSION: usize = 3;

/// The Hart State Management extension.
pub const EXTENSION_HSM: usize = 0x0048_534D;
/// Function of [`EXTENSION_HSM`] starting a stopped hart.
const HSM_HART_START: usize = 0;

/// `SBI_ERR_INVALID_PARAM`.
const ERROR_INVALID_PARAM: isize = -3;
/// `SBI_ERR_INVALID_ADDRESS`.
const ERROR_INVALID_ADDRESS: isize = -5;
/// `SBI_ERR_ALREADY_AVAILABLE`.
const ERROR_ALREADY_AVAILABLE: isize = -6;

/// The pair of values every SBI call returns.
struct SbiReturn {
    /// Zero on success, a negative `SBI_ERR_*` code otherwise.
    error: isize,
    /// The call-specific result.
    value: usize,
}

/// Performs an SBI call.
///
/// # Safety
///
/// The call described by `extension` and `function` must be valid with the given arguments.
unsafe fn call(
    extension: usize,
    function: usize,
    arg0: usize,
    arg1: usize,
    arg2: usize,
) -> SbiReturn {
    let error: isize;
    let value: usize;

    // SAFETY:
    // The caller guarantees the call is valid, and the SBI calling convention only clobbers
    // `a0` and `a1`.
    unsafe {
        core::arch::asm!(
            "ecall",
            inlateout("a0") arg0 => error,
            inlateout("a1") arg1 => value,
            in("a2") arg2,
            in("a6") function,
            in("a7") extension,
            options(nostack),
        )
    }

    SbiReturn { error, value }
}

/// Returns `true` if the firmware implements `extension`.
pub fn probe_extension(extension: usize) -> bool {
    // SAFETY:
    // Probing has no side effects and accepts any extension identifier.
    let result = unsafe { call(EXTENSION_BASE, BASE_PROBE_EXTENSION, extension, 0, 0) };

    result.error == 0 && result.value != 0
}

/// Starts `hart` at the physical address `start` with `opaque` in `a1` and its id in `a0`.
///
/// # Errors
///
/// Returns [`StartError`] translated from the firmware's error code.
///
/// # Safety
///
/// `start` must be the entry point of code that can run on `hart` with translation disabled.
pub unsafe fn hart_start(hart: usize, start: usize, opaque: usize) -> Result<(), StartError> {
    // SAFETY:
    // The caller guarantees that `start` is a valid entry point for `hart`.
    let result = unsafe { call(EXTENSION_HSM, HSM_HART_START, hart, start, opaque) };

    match result.error {
        0 => Ok(()),
        ERROR_INVALID_PARAM => Err(StartError::NoSuchHart),
        ERROR_INVALID_ADDRESS => Err(StartError::InvalidEntry),
        ERROR_ALREADY_AVAILABLE => Err(StartError::AlreadyStarted),
        error => Err(StartError::Other(error)),
    }
}
