//! Core library entry for the `devkit` CLI.
//!
//! The heart of the crate is [`runner::CommandRunner`], which runs one
//! external command to completion with stdout and stderr captured to files
//! and reports a nonzero exit as a typed [`runner::RunError`].

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod ports;
pub mod runner;

pub use error::Error;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print to stdout and return `Ok`.
///
/// # Errors
///
/// Returns an error when argument parsing, configuration, or the selected
/// command fails.
pub fn run<I, T>(args: I) -> Result<(), Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print()?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let config = config::Config::load()?;
    commands::dispatch(&cli, &config)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_prints_help() {
        let result = run(["devkit", "--help"]);
        assert!(result.is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["devkit", "unknown"]);
        assert!(matches!(result, Err(super::Error::Cli(_))));
    }
}
