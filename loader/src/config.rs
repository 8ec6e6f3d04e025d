//! Build-time configuration of the bare-metal loader.
//!
//! The values are provided through the environment by `build.rs`, which falls back to defaults
//! when the variables are unset.

/// The number of cores taking part in a boot episode, including the primary core.
pub const MAX_CORES: usize = parse_decimal(env!("LOADER_MAX_CORES"));

/// The base-2 logarithm of the size, in bytes, of each per-core stack.
pub const STACK_BITS: usize = parse_decimal(env!("LOADER_STACK_BITS"));

/// The size, in bytes, of each per-core stack.
pub const STACK_SIZE: usize = 1 << STACK_BITS;

/// The number of user images the image loader may produce. The handoff ABI has room for one.
pub const MAX_APPS: usize = 1;

const _: () = assert!(MAX_CORES >= 1, "LOADER_MAX_CORES must be at least 1");
const _: () = assert!(
    STACK_BITS >= 12 && STACK_BITS < usize::BITS as usize,
    "LOADER_STACK_BITS must be at least 12"
);

/// Parses `value` as a decimal `usize`, failing the build when it is not one.
const fn parse_decimal(value: &str) -> usize {
    match usize::from_str_radix(value, 10) {
        Ok(value) => value,
        Err(_) => panic!("configuration value is not a decimal integer"),
    }
}
