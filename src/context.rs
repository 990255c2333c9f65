//! Service context bundling the ports and the log sink for one invocation.

use std::path::{Path, PathBuf};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::shell::LiveShellExecutor;
use crate::config::Config;
use crate::logging::LogContext;
use crate::ports::clock::Clock;
use crate::ports::shell::{CommandLine, ShellExecutor};
use crate::runner::{CommandRunner, ExecutionRequest, DEFAULT_PREVIEW_BYTES};

/// Everything a subcommand needs to run external commands.
pub struct ServiceContext {
    /// Clock for timestamps.
    pub clock: Box<dyn Clock>,
    /// Shell executor for spawning commands.
    pub shell: Box<dyn ShellExecutor>,
    /// Log sink shared by every runner built from this context.
    pub log: LogContext,
    /// Directory for capture files.
    pub outdir: PathBuf,
    /// Echo progress details on stderr.
    pub verbose: bool,
    preview_bytes: usize,
}

impl ServiceContext {
    /// Creates a live context with the real clock and a shell from `config`.
    #[must_use]
    pub fn live(config: &Config, outdir: PathBuf, log: LogContext, verbose: bool) -> Self {
        Self {
            clock: Box::new(LiveClock),
            shell: Box::new(LiveShellExecutor::new(config.shell.clone())),
            log,
            outdir,
            verbose,
            preview_bytes: config.log_preview_bytes,
        }
    }

    /// Creates a context around caller-supplied ports.
    #[must_use]
    pub fn with_ports(
        clock: Box<dyn Clock>,
        shell: Box<dyn ShellExecutor>,
        log: LogContext,
        outdir: &Path,
    ) -> Self {
        Self {
            clock,
            shell,
            log,
            outdir: outdir.to_path_buf(),
            verbose: false,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }

    /// A runner whose default capture files are named after `basename`.
    #[must_use]
    pub fn runner(&self, basename: &str) -> CommandRunner<'_> {
        CommandRunner::new(self.shell.as_ref(), self.clock.as_ref(), &self.log)
            .with_basename(basename)
            .with_preview_bytes(self.preview_bytes)
    }

    /// A request that captures into this context's output directory.
    #[must_use]
    pub fn request(&self, command: CommandLine) -> ExecutionRequest {
        ExecutionRequest::new(command, &self.outdir)
    }

    /// Prints `message` on stderr when running verbosely.
    pub fn note(&self, message: &str) {
        if self.verbose {
            eprintln!("{message}");
        }
    }
}
