//! Sprig: template-based microservice scaffolding composer.
//!
//! This is the main entry point for the `sprig` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and handles errors with
//! proper exit codes.

pub mod addon;
mod cli;
mod commands;
pub mod compose;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod ports;
pub mod report;
pub mod service;
pub mod template;
pub mod tools;
pub mod tree;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
