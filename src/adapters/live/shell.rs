//! Live shell executor using `std::process::Command`.

use std::fs::File;
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::ports::shell::{CommandLine, RunningProcess, ShellExecutor};

/// Shell used for `CommandLine::Shell` when none is configured.
pub const DEFAULT_SHELL: &str = "sh";

/// Live shell executor that spawns real OS processes.
pub struct LiveShellExecutor {
    shell: String,
}

impl LiveShellExecutor {
    /// Creates an executor that interprets shell strings with `shell -c`.
    #[must_use]
    pub fn new(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }
}

impl Default for LiveShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellExecutor for LiveShellExecutor {
    fn spawn(
        &self,
        command: &CommandLine,
        stdout: File,
        stderr: File,
    ) -> io::Result<Box<dyn RunningProcess>> {
        let mut process = match command {
            CommandLine::Shell(line) => {
                let mut process = Command::new(&self.shell);
                process.arg("-c").arg(line);
                process
            }
            CommandLine::Argv(argv) => {
                let (program, args) = argv.split_first().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector")
                })?;
                let mut process = Command::new(program);
                process.args(args);
                process
            }
        };
        let child = process.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr)).spawn()?;
        Ok(Box::new(LiveProcess(child)))
    }
}

struct LiveProcess(Child);

impl RunningProcess for LiveProcess {
    fn id(&self) -> u32 {
        self.0.id()
    }

    fn wait(&mut self) -> io::Result<i32> {
        self.0.wait().map(exit_code)
    }
}

/// Maps a process status to a shell-style exit code.
///
/// Signal deaths are reported as `128 + signal`, the way `sh` reports them.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(-1)
}
