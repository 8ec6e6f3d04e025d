//! Automation for analyzing, building, and running `handoff-loader`.

use anyhow::Result;

use crate::{
    action::{build_loader::build_loader, clippy::clippy, run::run},
    cli::Action,
};

pub mod action;
pub mod cli;
pub mod common;

/// The host-testable packages of the workspace.
pub const LIBRARIES: &[&str] = &["boot_abi", "sync"];

fn main() -> Result<()> {
    match cli::get_action() {
        Action::BuildLoader(config) => {
            let path = build_loader(&config)?;
            println!("handoff-loader located at \"{}\"", path.display());
        }
        Action::Run(config) => run(config)?,
        Action::Clippy(config) => clippy(config)?,
    }

    Ok(())
}
