//! Shell executor port for spawning external commands.

use std::fmt;
use std::fs::File;
use std::io;

/// A command to execute, either through a shell or as a direct argv vector.
///
/// `Shell` strings are handed to the shell verbatim, so pipes, redirection
/// and variable expansion all work. Never build one from untrusted input;
/// use `Argv` when shell features are not needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// A command string interpreted by the shell (`sh -c <string>`).
    Shell(String),
    /// A program followed by its arguments, executed without a shell.
    Argv(Vec<String>),
}

impl CommandLine {
    /// Returns `true` if there is nothing to execute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Shell(command) => command.trim().is_empty(),
            Self::Argv(argv) => match argv.first() {
                Some(program) => program.trim().is_empty(),
                None => true,
            },
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell(command) => f.write_str(command),
            Self::Argv(argv) => f.write_str(&argv.join(" ")),
        }
    }
}

/// A spawned child process that has not been waited on yet.
pub trait RunningProcess {
    /// The OS process identifier assigned at spawn time.
    fn id(&self) -> u32;

    /// Blocks until the process exits and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS wait call fails.
    fn wait(&mut self) -> io::Result<i32>;
}

/// Spawns external commands with their output streams redirected to files.
///
/// Abstracting process creation lets the runner be exercised with fakes
/// that never touch the OS process table.
pub trait ShellExecutor: Send + Sync {
    /// Starts `command` with stdout and stderr written to the given files.
    /// stdin is inherited from the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn(
        &self,
        command: &CommandLine,
        stdout: File,
        stderr: File,
    ) -> io::Result<Box<dyn RunningProcess>>;
}
