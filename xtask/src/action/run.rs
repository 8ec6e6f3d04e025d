//! Helper function to run `handoff-loader` given a [`RunConfig`].

use anyhow::Result;

use crate::{
    action::{build_loader::build_loader, run_cmd},
    cli::run::RunConfig,
    common::Arch,
};

/// Builds `handoff-loader` and boots it on an emulated machine with one hart per configured core.
///
/// # Errors
///
/// Returns errors when the `cargo build` command fails or an error occurs when running
/// `handoff-loader` using `QEMU`.
pub fn run(config: RunConfig) -> Result<()> {
    let loader = build_loader(&config.loader)?;

    let mut cmd = std::process::Command::new(config.loader.arch.as_qemu_executable());

    match config.loader.arch {
        Arch::Riscv64 => {
            cmd.args(["-machine", "virt"]);
            // OpenSBI provides the HSM extension and enters the loader in supervisor mode.
            cmd.args(["-bios", "default"]);
        }
    }

    cmd.arg("-smp").arg(config.loader.max_cores.to_string());
    cmd.arg("-m").arg(format!("{}M", config.memory));
    cmd.arg("-kernel").arg(loader);
    cmd.arg("-nographic");

    if let Some(serial_file) = &config.serial_file {
        cmd.arg("-serial")
            .arg(format!("file:{}", serial_file.display()));
    }

    if config.gdb {
        cmd.args(["-s", "-S"]);
    }

    run_cmd(cmd).map_err(|error| error.into())
}
