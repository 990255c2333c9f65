//! Errors raised while running a command.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a command run did not produce an `ExecutionResult`.
///
/// None of these are retried. `NonZeroExit` leaves the capture files on
/// disk so the caller can inspect what the command printed.
#[derive(Debug, Error)]
pub enum RunError {
    /// The request carried no command.
    #[error("no command was specified")]
    EmptyCommand,

    /// The output directory or a capture file could not be prepared.
    #[error("filesystem error at '{}': {source}", .path.display())]
    Filesystem {
        /// The directory or file being created or removed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The process could not be started.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        /// The command text.
        command: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Waiting on the child process failed.
    #[error("failed to wait for process {process_id} ('{command}'): {source}")]
    Wait {
        /// The command text.
        command: String,
        /// The child's process id.
        process_id: u32,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The process ran and exited with a nonzero status.
    #[error(
        "command '{command}' exited with status {exit_status} (stderr: '{}')",
        .stderr_path.display()
    )]
    NonZeroExit {
        /// The command text.
        command: String,
        /// The exit status reported by the OS.
        exit_status: i32,
        /// The child's process id.
        process_id: u32,
        /// Where stdout was captured.
        stdout_path: PathBuf,
        /// Where stderr was captured.
        stderr_path: PathBuf,
    },
}

impl RunError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Filesystem { path, source }
    }
}
