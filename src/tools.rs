//! External tool runner for sprig.
//!
//! Provides a safe wrapper around collaborator commands (git, gh, gradle,
//! post-compose hooks) with captured stdout/stderr and structured error
//! handling. Collaborators are opaque: sprig inspects their exit status and
//! surfaces their stderr, but never parses their unstructured output for
//! control decisions.

use crate::error::{Result, SprigError};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a successful tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl ToolOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run an external tool to completion, blocking.
///
/// # Returns
///
/// * `Ok(ToolOutput)` - on exit code 0
/// * `Err(SprigError::MissingDependency)` - if the program cannot be found
/// * `Err(SprigError::Tool)` - on a non-zero exit code, carrying that code
pub fn run_tool<P: AsRef<Path>>(cwd: P, program: &str, args: &[&str]) -> Result<ToolOutput> {
    let output = Command::new(program)
        .current_dir(cwd.as_ref())
        .args(args)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SprigError::MissingDependency(format!(
                    "'{}' is not installed or not on PATH. Install it and rerun.",
                    program
                ))
            } else {
                SprigError::Tool {
                    tool: program.to_string(),
                    code: -1,
                    message: format!("failed to execute: {}", e),
                }
            }
        })?;

    let tool_output = ToolOutput::from_output(&output);

    if output.status.success() {
        Ok(tool_output)
    } else {
        let code = output.status.code().unwrap_or(-1);
        let message = if tool_output.stderr.is_empty() {
            tool_output.stdout.clone()
        } else {
            tool_output.stderr.clone()
        };
        Err(SprigError::Tool {
            tool: format!("{} {}", program, args.first().unwrap_or(&"")),
            code,
            message,
        })
    }
}

/// Check whether a tool is installed by running it with a probe argument
/// (typically `--version`). Output is discarded; only spawnability and exit
/// status matter.
pub fn probe(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Require a tool to be present, with a remediation hint on failure.
pub fn require(program: &str, probe_args: &[&str], remediation: &str) -> Result<()> {
    if probe(program, probe_args) {
        Ok(())
    } else {
        Err(SprigError::MissingDependency(format!(
            "'{}' is required but was not found.\n{}",
            program, remediation
        )))
    }
}
