//! opsgate: pipeline gates and declarative command synthesis for DevOps workflows.
//!
//! This is the main entry point for the `opsgate` CLI. It parses arguments,
//! installs the stderr tracing subscriber, dispatches to the appropriate command handler,
//! and handles errors with proper exit codes.

mod cli;
mod commands;
mod logging;

use cli::Cli;
use opsgate::exit_codes;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match commands::dispatch(&cli.config, cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
