//! `devkit start-of-day` command.

use tracing::info;

use crate::config::ConfigError;
use crate::context::ServiceContext;
use crate::error::Error;
use crate::ports::CommandLine;

/// Execute the `start-of-day` command.
///
/// Each configured command runs through the shell with its own capture
/// files (`start-of-day-1.stdout`, `start-of-day-2.stdout`, ...). The first
/// failure stops the sequence.
///
/// # Errors
///
/// Returns an error if nothing is configured or any command fails.
pub fn run(ctx: &ServiceContext, commands: &[String]) -> Result<(), Error> {
    if commands.is_empty() {
        return Err(ConfigError::Missing(
            "no start_of_day commands are configured".to_string(),
        )
        .into());
    }

    for (index, command) in commands.iter().enumerate() {
        let step = index + 1;
        println!("\nNow attempting to execute {command}");
        info!("Start-of-day step {step} of {}", commands.len());
        let runner = ctx.runner(&format!("start-of-day-{step}"));
        runner.run(&ctx.request(CommandLine::Shell(command.clone())))?;
    }

    println!("Have a great day!!");
    Ok(())
}
