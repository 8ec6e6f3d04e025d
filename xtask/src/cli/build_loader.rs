//! Command line parsing and [`Action::BuildLoader`][abl] construction.
//!
//! [abl]: crate::cli::Action::BuildLoader

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command, builder::EnumValueParser, value_parser};

use crate::common::{Arch, Profile};

/// Description of various parameters of the `handoff-loader` build process and the built-in
/// configuration of `handoff-loader`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct BuildLoaderConfig {
    /// The [`Arch`] for which `handoff-loader` should be built.
    pub arch: Arch,
    /// The [`Profile`] with which `handoff-loader` should be built.
    pub profile: Profile,
    /// The number of cores taking part in a boot.
    pub max_cores: u32,
    /// The base-2 logarithm of each per-core stack size.
    pub stack_bits: u32,
    /// A static library providing the image loader, device drivers and page table setup.
    pub platform_lib: Option<PathBuf>,
}

/// Parses the arguments required to produce a valid [`BuildLoaderConfig`].
pub fn parse_arguments(matches: &ArgMatches) -> BuildLoaderConfig {
    let arch = matches
        .get_one::<Arch>("arch")
        .copied()
        .unwrap_or_else(|| unreachable!("`arch` should have a default value"));

    let profile = matches
        .get_one::<Profile>("profile")
        .copied()
        .unwrap_or_else(|| unreachable!("`profile` should have a default value"));

    let max_cores = matches
        .get_one::<u32>("max-cores")
        .copied()
        .unwrap_or_else(|| unreachable!("`max-cores` should have a default value"));

    let stack_bits = matches
        .get_one::<u32>("stack-bits")
        .copied()
        .unwrap_or_else(|| unreachable!("`stack-bits` should have a default value"));

    let platform_lib = matches.get_one::<PathBuf>("platform-lib").cloned();

    BuildLoaderConfig {
        arch,
        profile,
        max_cores,
        stack_bits,
        platform_lib,
    }
}

/// Returns the arguments shared by every subcommand that builds `handoff-loader`.
pub fn build_arguments() -> [Arg; 5] {
    let arch = Arg::new("arch")
        .long("arch")
        .value_parser(EnumValueParser::<Arch>::new())
        .default_value("riscv64");

    let profile = Arg::new("profile")
        .long("profile")
        .value_parser(EnumValueParser::<Profile>::new())
        .default_value("dev");

    let max_cores = Arg::new("max-cores")
        .long("max-cores")
        .help("The number of cores taking part in a boot")
        .value_parser(value_parser!(u32).range(1..))
        .default_value("1");

    let stack_bits = Arg::new("stack-bits")
        .long("stack-bits")
        .help("The base-2 logarithm of each per-core stack size")
        .value_parser(value_parser!(u32).range(12..32))
        .default_value("14");

    let platform_lib = Arg::new("platform-lib")
        .long("platform-lib")
        .env("LOADER_PLATFORM_LIB")
        .help("Static library providing the image loader and device drivers")
        .value_parser(value_parser!(PathBuf));

    [arch, profile, max_cores, stack_bits, platform_lib]
}

/// Returns the command parser for an [`Action::BuildLoader`][abl].
///
/// [abl]: crate::cli::Action::BuildLoader
pub fn subcommand_parser() -> Command {
    Command::new("build-loader")
        .about("Builds `handoff-loader`")
        .args(build_arguments())
}

#[cfg(test)]
mod test {
    use super::{BuildLoaderConfig, parse_arguments, subcommand_parser};
    use crate::common::{Arch, Profile};

    #[test]
    fn defaults_to_a_single_core_dev_build() {
        let matches = subcommand_parser()
            .try_get_matches_from(["build-loader"])
            .unwrap();

        assert_eq!(
            parse_arguments(&matches),
            BuildLoaderConfig {
                arch: Arch::Riscv64,
                profile: Profile::Dev,
                max_cores: 1,
                stack_bits: 14,
                platform_lib: None,
            }
        );
    }

    #[test]
    fn rejects_zero_cores() {
        assert!(
            subcommand_parser()
                .try_get_matches_from(["build-loader", "--max-cores", "0"])
                .is_err()
        );
    }
}
