//! Command line parsing and [`Action::Run`][ar] construction.
//!
//! [ar]: crate::cli::Action::Run

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::cli::build_loader::{self, BuildLoaderConfig};

/// Description of how to obtain `handoff-loader` and of the machine it runs on.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct RunConfig {
    /// The configuration used to build `handoff-loader`.
    pub loader: BuildLoaderConfig,
    /// The amount of guest memory, in MiB.
    pub memory: u32,
    /// A file to which the guest's serial output is written instead of the terminal.
    pub serial_file: Option<PathBuf>,
    /// Whether QEMU should wait for a debugger before starting the guest.
    pub gdb: bool,
}

/// Parses the arguments required to produce a valid [`RunConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> RunConfig {
    let loader = build_loader::parse_arguments(matches);

    let memory = matches
        .get_one::<u32>("memory")
        .copied()
        .unwrap_or_else(|| unreachable!("`memory` should have a default value"));

    let serial_file = matches.get_one::<PathBuf>("serial-file").cloned();
    let gdb = matches.get_flag("gdb");

    RunConfig {
        loader,
        memory,
        serial_file,
        gdb,
    }
}

/// Returns the command parser for an [`Action::Run`][ar]
///
/// [ar]: crate::cli::Action::Run
pub fn subcommand_parser() -> Command {
    let memory = Arg::new("memory")
        .long("memory")
        .help("Guest memory in MiB")
        .value_parser(value_parser!(u32).range(64..))
        .default_value("512");

    let serial_file = Arg::new("serial-file")
        .long("serial-file")
        .value_parser(value_parser!(PathBuf));

    let gdb = Arg::new("gdb")
        .long("gdb")
        .help("Wait for a debugger on the integrated GDB stub")
        .action(ArgAction::SetTrue);

    Command::new("run")
        .about("Builds `handoff-loader` and runs it on a QEMU `virt` machine")
        .args(build_loader::build_arguments())
        .arg(memory)
        .arg(serial_file)
        .arg(gdb)
}
