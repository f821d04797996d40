//! Implementation of the `sprig doctor` command.
//!
//! Probes the external tools sprig shells out to and reports what is
//! missing, with remediation hints. Only `git` is strictly required for
//! composing a service; `gh` is needed for `--github`, and docker/java
//! matter once the generated service and its smoke test are actually run.

mod checks;

use crate::cli::DoctorArgs;
use crate::error::{Result, SprigError};
use serde::Serialize;

pub use checks::{run_checks, ToolCheck, TOOL_CHECKS};

/// Outcome of probing one tool.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub tool: String,
    pub present: bool,
    pub required: bool,
    pub purpose: String,
    /// Remediation hint, set when the tool is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// Aggregated doctor report.
#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    /// Required tools that are missing.
    pub fn missing_required(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.required && !c.present)
            .collect()
    }
}

/// Execute the `sprig doctor` command.
pub fn cmd_doctor(args: DoctorArgs) -> Result<()> {
    let report = run_checks();

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| SprigError::User(format!("failed to serialize report: {}", e)))?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    let missing = report.missing_required();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SprigError::MissingDependency(format!(
            "{} required tool(s) missing: {}",
            missing.len(),
            missing
                .iter()
                .map(|c| c.tool.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

fn print_report(report: &DoctorReport) {
    println!("Tool checks:");
    println!();
    for check in &report.checks {
        let status = if check.present { "ok" } else { "MISSING" };
        let kind = if check.required { "required" } else { "optional" };
        println!("  {:<8} {:<10} {} ({})", check.tool, status, check.purpose, kind);
        if !check.present
            && let Some(remediation) = &check.remediation
        {
            println!("           -> {}", remediation);
        }
    }
    println!();

    let missing_optional = report
        .checks
        .iter()
        .filter(|c| !c.required && !c.present)
        .count();
    if missing_optional > 0 {
        println!(
            "Note: {} optional tool(s) missing; some workflows will be unavailable.",
            missing_optional
        );
    }
}
