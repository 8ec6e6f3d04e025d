//! Helper function to run `cargo clippy` on all packages given a [`ClippyConfig`].

use anyhow::Result;

use crate::{LIBRARIES, action::run_cmd, cli::clippy::ClippyConfig};

/// Runs `cargo clippy` on the host for every package, then on the target for `handoff-loader`.
///
/// On the host, `handoff-loader` is only checked with its tests: outside of them it is a
/// `no_main` binary without a panic handler.
///
/// # Errors
///
/// Returns errors when a `cargo clippy` command fails.
pub fn clippy(config: ClippyConfig) -> Result<()> {
    if config.checks.host() {
        let mut cmd = std::process::Command::new("cargo");
        cmd.arg("clippy");

        for package in LIBRARIES.iter().chain(&["xtask"]) {
            cmd.args(["--package", *package]);
        }
        cmd.args(["--no-deps", "--all-targets"]);

        run_cmd(cmd)?;

        let mut cmd = std::process::Command::new("cargo");
        cmd.arg("clippy");

        cmd.args(["--package", "handoff-loader"]);
        cmd.args(["--no-deps", "--tests"]);

        run_cmd(cmd)?;
    }

    if config.checks.target() {
        let mut cmd = std::process::Command::new("cargo");
        cmd.arg("clippy");

        cmd.args(["--package", "handoff-loader"]);
        cmd.arg("--no-deps");
        cmd.args(["--target", config.arch.as_target_triple()]);

        run_cmd(cmd)?;
    }

    Ok(())
}
