//! Command line parsing and [`Action::Clippy`][ac] construction.
//!
//! [ac]: crate::cli::Action::Clippy

use clap::{Arg, ArgMatches, Command, builder::EnumValueParser};

use crate::common::Arch;

/// Description of various parameters used for `cargo clippy`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ClippyConfig {
    /// The [`Arch`] for which the bare-metal `handoff-loader` is checked.
    pub arch: Arch,
    /// Which builds are checked.
    pub checks: Checks,
}

/// The builds `cargo clippy` is run over.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Checks {
    /// Host builds: every package with its tests, including the simulated boot of
    /// `handoff-loader`.
    Host,
    /// The bare-metal `handoff-loader` binary.
    Target,
    /// Both of the above.
    #[default]
    All,
}

impl Checks {
    /// Returns the textual representation of the [`Checks`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Target => "target",
            Self::All => "all",
        }
    }

    /// Returns `true` if host builds are checked.
    pub fn host(&self) -> bool {
        matches!(self, Self::Host | Self::All)
    }

    /// Returns `true` if the bare-metal build is checked.
    pub fn target(&self) -> bool {
        matches!(self, Self::Target | Self::All)
    }
}

impl clap::ValueEnum for Checks {
    fn value_variants<'a>() -> &'a [Self] {
        static CHECKS: &[Checks] = &[Checks::Host, Checks::Target, Checks::All];

        CHECKS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Parses the arguments required to produce a valid [`ClippyConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> ClippyConfig {
    let arch = matches
        .get_one::<Arch>("arch")
        .copied()
        .unwrap_or_else(|| unreachable!("`arch` should have a default value"));
    let checks = matches
        .get_one::<Checks>("checks")
        .copied()
        .unwrap_or_else(|| unreachable!("`checks` should have a default value"));

    ClippyConfig { arch, checks }
}

/// Returns the command parser for an [`Action::Clippy`][ac].
///
/// [ac]: crate::cli::Action::Clippy
pub fn subcommand_parser() -> Command {
    let arch = Arg::new("arch")
        .long("arch")
        .value_parser(EnumValueParser::<Arch>::new())
        .default_value("riscv64");
    let checks = Arg::new("checks")
        .long("checks")
        .help("The builds to lint")
        .value_parser(EnumValueParser::<Checks>::new())
        .default_value("all");

    Command::new("clippy")
        .about("Run clippy on the host-tested packages and the bare-metal loader")
        .arg(arch)
        .arg(checks)
}
