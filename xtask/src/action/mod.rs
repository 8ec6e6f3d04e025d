//! Implementations of the [`Action`][action]s.
//!
//! [action]: crate::cli::Action

use std::{error, fmt, io};

pub mod build_loader;
pub mod clippy;
pub mod run;

/// Runs a [`Command`][c], handling non-zero exit codes and other failures.
///
/// # Errors
///
/// - [`RunCommandError::ProcessError`]: Returned if an error occurred while launching the command.
/// - [`RunCommandError::CommandFailed`]: Returned if the command exited with a non-zero exit value.
///
/// Both name the program that was run.
///
/// [c]: std::process::Command
pub fn run_cmd(mut cmd: std::process::Command) -> Result<(), RunCommandError> {
    println!("Running command: {cmd:?}");

    let program = cmd.get_program().to_string_lossy().into_owned();
    let status = cmd.status().map_err(|error| RunCommandError::ProcessError {
        program: program.clone(),
        error,
    })?;
    if !status.success() {
        return Err(RunCommandError::CommandFailed {
            program,
            code: status.code(),
        });
    }

    Ok(())
}

/// Various errors that can occur while running a command.
#[derive(Debug)]
pub enum RunCommandError {
    /// An error occurred while launching the command.
    ProcessError {
        /// The program that could not be launched.
        program: String,
        /// The underlying error.
        error: io::Error,
    },
    /// The command exited with a non-zero exit code.
    CommandFailed {
        /// The program that failed.
        program: String,
        /// The exit of code of the command.
        code: Option<i32>,
    },
}

impl fmt::Display for RunCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcessError { program, error } => {
                write!(f, "error launching `{program}`: {error}")
            }
            Self::CommandFailed {
                program,
                code: Some(code),
            } => write!(f, "`{program}` failed with exit status {code}"),
            Self::CommandFailed {
                program,
                code: None,
            } => write!(f, "`{program}` terminated by signal"),
        }
    }
}

impl error::Error for RunCommandError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::ProcessError { error, .. } => Some(error),
            Self::CommandFailed { .. } => None,
        }
    }
}
