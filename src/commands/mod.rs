//! Command implementations for sprig.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod addons;
mod doctor;
mod new;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::New(args) => new::cmd_new(args),
        Command::Addons => addons::cmd_addons(),
        Command::Doctor(args) => doctor::cmd_doctor(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_routes_addons() {
        assert!(dispatch(Command::Addons).is_ok());
    }
}
