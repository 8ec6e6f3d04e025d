//! Helper function to build `handoff-loader` given a [`BuildLoaderConfig`].

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{action::run_cmd, cli::build_loader::BuildLoaderConfig};

/// Builds `handoff-loader` as specified by `config`, returning the path to the final binary on
/// success.
///
/// # Errors
///
/// Returns errors when the platform library does not exist or the `cargo build` command fails.
pub fn build_loader(config: &BuildLoaderConfig) -> Result<PathBuf> {
    let mut cmd = std::process::Command::new("cargo");
    cmd.arg("build");

    cmd.args(["--package", "handoff-loader"]);
    cmd.args(["--target", config.arch.as_target_triple()]);
    cmd.args(["--profile", config.profile.as_str()]);

    cmd.env("LOADER_MAX_CORES", config.max_cores.to_string());
    cmd.env("LOADER_STACK_BITS", config.stack_bits.to_string());
    if let Some(platform_lib) = &config.platform_lib {
        let platform_lib = platform_lib.canonicalize().with_context(|| {
            format!("platform library \"{}\" not found", platform_lib.display())
        })?;
        cmd.env("LOADER_PLATFORM_LIB", platform_lib);
    }

    run_cmd(cmd)?;

    let mut binary_location = PathBuf::with_capacity(50);
    binary_location.push("target");
    binary_location.push(config.arch.as_target_triple());
    binary_location.push(config.profile.target_string());
    binary_location.push("handoff-loader");

    Ok(binary_location)
}
