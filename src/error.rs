//! Top-level error type for the `devkit` CLI.

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LogError;
use crate::runner::RunError;

/// Anything that makes a `devkit` invocation fail.
#[derive(Debug, Error)]
pub enum Error {
    /// Command-line arguments were rejected.
    #[error(transparent)]
    Cli(#[from] clap::Error),

    /// Configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The log file could not be opened.
    #[error(transparent)]
    Log(#[from] LogError),

    /// A command failed to run or exited nonzero.
    #[error(transparent)]
    Run(#[from] RunError),

    /// A command succeeded but did not leave the file it should have.
    #[error("expected file '{}' does not exist", .0.display())]
    MissingOutput(std::path::PathBuf),

    /// Writing results to the terminal or reading a produced file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A result could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
