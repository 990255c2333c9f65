//! `devkit run` command.

use std::path::Path;

use crate::context::ServiceContext;
use crate::error::Error;
use crate::ports::CommandLine;
use crate::runner::DEFAULT_BASENAME;

/// Arguments for a single `run` invocation.
#[derive(Debug)]
pub struct RunArgs<'a> {
    /// Command words as given on the command line.
    pub command: &'a [String],
    /// Execute the words as argv rather than a shell string.
    pub no_shell: bool,
    /// Stdout capture override.
    pub stdout_file: Option<&'a Path>,
    /// Stderr capture override.
    pub stderr_file: Option<&'a Path>,
    /// Print the result as JSON.
    pub json: bool,
}

/// Execute the `run` command.
///
/// Shell mode joins the words with spaces, so `devkit run -- 'ls | wc -l'`
/// and `devkit run -- ls '|' wc -l` behave the same.
///
/// # Errors
///
/// Returns an error if the command is empty, cannot be run, or exits nonzero.
pub fn run(ctx: &ServiceContext, args: &RunArgs<'_>) -> Result<(), Error> {
    let command = if args.no_shell {
        CommandLine::Argv(args.command.to_vec())
    } else {
        CommandLine::Shell(args.command.join(" "))
    };

    let mut request = ctx.request(command);
    if let Some(path) = args.stdout_file {
        request = request.with_stdout_path(path);
    }
    if let Some(path) = args.stderr_file {
        request = request.with_stderr_path(path);
    }

    let result = ctx.runner(DEFAULT_BASENAME).run(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("stdout: {}", result.stdout_path.display());
        println!("stderr: {}", result.stderr_path.display());
    }
    Ok(())
}
