//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `devkit`.
#[derive(Debug, Parser)]
#[command(name = "devkit", version, about = "Workstation helpers that run commands with captured output")]
pub struct Cli {
    /// Directory for capture files and the log file.
    /// Defaults to `<output_root>/<subcommand>/<timestamp>`.
    #[arg(long, global = true, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Log file. Defaults to `<outdir>/devkit.log`.
    #[arg(long, global = true, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Report defaulted settings and progress on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a command, capturing stdout and stderr to files.
    Run {
        /// Execute the words directly instead of through the shell.
        #[arg(long)]
        no_shell: bool,

        /// Capture stdout here instead of `<outdir>/devkit.stdout`.
        #[arg(long, value_name = "FILE")]
        stdout_file: Option<PathBuf>,

        /// Capture stderr here instead of `<outdir>/devkit.stderr`.
        #[arg(long, value_name = "FILE")]
        stderr_file: Option<PathBuf>,

        /// Print the execution result as JSON.
        #[arg(long)]
        json: bool,

        /// The command, e.g. `devkit run -- 'ls | wc -l'`.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Create an ed25519 SSH key with ssh-keygen.
    SshKey {
        /// Email address recorded in the key comment.
        #[arg(long, env = "GIT_CONFIG_EMAIL")]
        email_address: Option<String>,
    },
    /// Run the configured start-of-day commands in order.
    StartOfDay,
}

impl Command {
    /// Name used for the default output directory and capture files.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run { .. } => "run",
            Self::SshKey { .. } => "ssh-key",
            Self::StartOfDay => "start-of-day",
        }
    }
}
