//! Command line parsing and [`Action`] construction.

use clap::Command;

use crate::cli::{build_loader::BuildLoaderConfig, clippy::ClippyConfig, run::RunConfig};

pub mod build_loader;
pub mod clippy;
pub mod run;

/// The action to carry out.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    /// Build `handoff-loader` with a specific configuration.
    BuildLoader(BuildLoaderConfig),
    /// Build `handoff-loader` and run it in QEMU.
    Run(RunConfig),
    /// Run `cargo clippy` on every package.
    Clippy(ClippyConfig),
}

/// Parses `xtask`'s arguments to construct an [`Action`].
pub fn get_action() -> Action {
    let matches = command_parser().get_matches();

    let Some((subcommand_name, subcommand_matches)) = matches.subcommand() else {
        unreachable!("subcommand is required");
    };
    match subcommand_name {
        "build-loader" => Action::BuildLoader(build_loader::parse_arguments(subcommand_matches)),
        "run" => Action::Run(run::parse_arguments(subcommand_matches)),
        "clippy" => Action::Clippy(clippy::parse_arguments(subcommand_matches)),
        _ => unreachable!("unexpected subcommand: {subcommand_name:?}"),
    }
}

/// Returns the command parser for all [`Action`]s.
fn command_parser() -> Command {
    Command::new("xtask")
        .about("Developer utility for running various tasks on handoff-loader")
        .subcommand(build_loader::subcommand_parser())
        .subcommand(run::subcommand_parser())
        .subcommand(clippy::subcommand_parser())
        .subcommand_required(true)
        .arg_required_else_help(true)
}
