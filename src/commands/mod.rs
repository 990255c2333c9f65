//! Command dispatch and handlers.

pub mod run;
pub mod ssh_key;
pub mod start_of_day;

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::adapters::live::clock::LiveClock;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::Error;
use crate::logging::LogContext;
use crate::ports::Clock;
use crate::runner::ensure_directory;

/// Name of the log file inside the output directory.
pub const LOG_FILE_NAME: &str = "devkit.log";

/// Format of the timestamped default output directory.
const OUTDIR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Prepare the output directory and log file, then dispatch `cli.command`.
///
/// Failures are logged at `ERROR` once the log file is open. Run failures
/// are left to the runner, which has already logged them.
///
/// # Errors
///
/// Returns an error if the output directory or log file cannot be set up,
/// or if the selected command fails.
pub fn dispatch(cli: &Cli, config: &Config) -> Result<(), Error> {
    let (outdir, defaulted) = match &cli.outdir {
        Some(dir) => (dir.clone(), false),
        None => (default_outdir(&config.output_root, cli.command.name(), &LiveClock), true),
    };
    let created = ensure_directory(&outdir)?;
    let logfile = cli.logfile.clone().unwrap_or_else(|| outdir.join(LOG_FILE_NAME));
    let log = LogContext::init(&logfile, config.level_filter()?)?;

    let ctx = ServiceContext::live(config, outdir, log, cli.verbose);
    if defaulted {
        ctx.note(&format!(
            "--outdir was not specified and therefore was set to '{}'",
            ctx.outdir.display()
        ));
    }
    if created {
        ctx.note(&format!("Created output directory '{}'", ctx.outdir.display()));
    }
    if let (None, Some(path)) = (&cli.logfile, ctx.log.path()) {
        ctx.note(&format!(
            "--logfile was not specified and therefore was set to '{}'",
            path.display()
        ));
    }

    ctx.log.in_scope(|| {
        info!("Running '{}' with output directory '{}'", cli.command.name(), ctx.outdir.display());
        let result = dispatch_with_context(&cli.command, config, &ctx);
        match &result {
            Err(Error::Run(_)) | Ok(()) => {}
            Err(err) => error!("'{}' failed: {err}", cli.command.name()),
        }
        result
    })
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    config: &Config,
    ctx: &ServiceContext,
) -> Result<(), Error> {
    match command {
        Command::Run { no_shell, stdout_file, stderr_file, json, command } => run::run(
            ctx,
            &run::RunArgs {
                command,
                no_shell: *no_shell,
                stdout_file: stdout_file.as_deref(),
                stderr_file: stderr_file.as_deref(),
                json: *json,
            },
        ),
        Command::SshKey { email_address } => {
            ssh_key::run(ctx, email_address.as_deref(), &config.ssh_dir()?)
        }
        Command::StartOfDay => start_of_day::run(ctx, &config.start_of_day),
    }
}

/// `<root>/<name>/<YYYY-MM-DD-HHMMSS>`.
#[must_use]
pub fn default_outdir(root: &Path, name: &str, clock: &dyn Clock) -> PathBuf {
    root.join(name).join(clock.now().format(OUTDIR_TIMESTAMP_FORMAT).to_string())
}
