//! Per-step composition reporting.
//!
//! Each composition step records a result; the aggregated report is printed
//! at the end of `sprig new` and decides the overall outcome. A failed step
//! aborts the remaining steps, so at most one `Fail` entry appears, always
//! last.

use chrono::{DateTime, Utc};

/// Status of a composition step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pass,
    Fail,
    Skip,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pass => write!(f, "ok"),
            StepStatus::Fail => write!(f, "FAILED"),
            StepStatus::Skip => write!(f, "skipped"),
        }
    }
}

/// Result of a single composition step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub status: StepStatus,
    pub message: Option<String>,
}

impl StepResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Pass,
            message: Some(message.into()),
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Fail,
            message: Some(message.into()),
        }
    }

    pub fn skip(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Skip,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, StepStatus::Pass | StepStatus::Skip)
    }
}

/// Aggregated result of one composition run.
#[derive(Debug)]
pub struct CompositionReport {
    pub steps: Vec<StepResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CompositionReport {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, step: StepResult) {
        self.steps.push(step);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when no step failed.
    pub fn ok(&self) -> bool {
        self.steps.iter().all(|s| s.is_success())
    }

    /// Message of the first failed step, if any.
    pub fn failure(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Fail)
            .and_then(|s| s.message.as_deref())
    }

    /// Print the step lines to stdout.
    pub fn print(&self) {
        for step in &self.steps {
            match &step.message {
                Some(message) => println!("  {:<28} {} ({})", step.name, step.status, message),
                None => println!("  {:<28} {}", step.name, step.status),
            }
        }
    }
}

impl Default for CompositionReport {
    fn default() -> Self {
        Self::new()
    }
}
