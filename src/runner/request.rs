//! Request and result types for a single command run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::ports::CommandLine;

/// Everything needed to run one command.
///
/// Built immediately before a call to `CommandRunner::run` and dropped
/// afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    command: CommandLine,
    output_directory: PathBuf,
    stdout_path: Option<PathBuf>,
    stderr_path: Option<PathBuf>,
}

impl ExecutionRequest {
    /// Creates a request for `command` with capture files in `output_directory`.
    #[must_use]
    pub fn new(command: CommandLine, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            command,
            output_directory: output_directory.into(),
            stdout_path: None,
            stderr_path: None,
        }
    }

    /// Shorthand for a request whose command is interpreted by the shell.
    #[must_use]
    pub fn shell(command: impl Into<String>, output_directory: impl Into<PathBuf>) -> Self {
        Self::new(CommandLine::Shell(command.into()), output_directory)
    }

    /// Shorthand for a request executed as a program plus arguments.
    #[must_use]
    pub fn argv<I, S>(argv: I, output_directory: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CommandLine::Argv(argv.into_iter().map(Into::into).collect()), output_directory)
    }

    /// Captures stdout to `path` instead of the default location.
    #[must_use]
    pub fn with_stdout_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_path = Some(path.into());
        self
    }

    /// Captures stderr to `path` instead of the default location.
    #[must_use]
    pub fn with_stderr_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr_path = Some(path.into());
        self
    }

    /// The command to run.
    #[must_use]
    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    /// The directory that receives the default capture files.
    #[must_use]
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// The stdout override, if any.
    #[must_use]
    pub fn stdout_path(&self) -> Option<&Path> {
        self.stdout_path.as_deref()
    }

    /// The stderr override, if any.
    #[must_use]
    pub fn stderr_path(&self) -> Option<&Path> {
        self.stderr_path.as_deref()
    }
}

/// The outcome of a command that exited successfully.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// The exit status reported by the OS. Always 0 for a returned result.
    pub exit_status: i32,
    /// The child's process id.
    pub process_id: u32,
    /// Where stdout was captured.
    pub stdout_path: PathBuf,
    /// Where stderr was captured.
    pub stderr_path: PathBuf,
    /// When the process was spawned.
    pub started_at: DateTime<Local>,
    /// When the process was observed to exit.
    pub finished_at: DateTime<Local>,
}
