//! Binary entrypoint for the `devkit` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // .env is optional.
    let _ = dotenvy::dotenv();
    match devkit::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(devkit::Error::Cli(err)) => {
            let _ = err.print();
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
