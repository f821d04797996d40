//! Tool presence checks for the doctor command.

use crate::tools::probe;

use super::{CheckResult, DoctorReport};

/// A single external tool sprig may shell out to.
#[derive(Debug, Clone, Copy)]
pub struct ToolCheck {
    pub tool: &'static str,
    pub probe_args: &'static [&'static str],
    pub required: bool,
    pub purpose: &'static str,
    pub remediation: &'static str,
}

/// The tools sprig cares about. `git` is the only hard requirement for
/// composing; the rest gate optional workflows.
pub const TOOL_CHECKS: &[ToolCheck] = &[
    ToolCheck {
        tool: "git",
        probe_args: &["--version"],
        required: true,
        purpose: "clone the template and commit the composed service",
        remediation: "Install git: https://git-scm.com/downloads",
    },
    ToolCheck {
        tool: "gh",
        probe_args: &["--version"],
        required: false,
        purpose: "create the remote repository (--github)",
        remediation: "Install the GitHub CLI: https://cli.github.com",
    },
    ToolCheck {
        tool: "docker",
        probe_args: &["--version"],
        required: false,
        purpose: "run the generated container-backed smoke test",
        remediation: "Install Docker: https://docs.docker.com/get-docker",
    },
    ToolCheck {
        tool: "java",
        probe_args: &["--version"],
        required: false,
        purpose: "build and run the generated service",
        remediation: "Install a JDK, e.g. https://adoptium.net",
    },
];

/// Probe every tool and collect the results.
pub fn run_checks() -> DoctorReport {
    let checks = TOOL_CHECKS
        .iter()
        .map(|check| {
            let present = probe(check.tool, check.probe_args);
            CheckResult {
                tool: check.tool.to_string(),
                present,
                required: check.required,
                purpose: check.purpose.to_string(),
                remediation: (!present).then(|| check.remediation.to_string()),
            }
        })
        .collect();

    DoctorReport { checks }
}
