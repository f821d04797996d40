//! Error types for the sprig CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Every failure path carries a human-readable cause and, where it helps, a
//! suggested remediation command. Nothing is retried automatically.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for sprig operations.
///
/// Each variant maps to a distinct exit code. The ordering of checks in
/// `sprig new` guarantees that `Validation` errors are reported before any
/// filesystem mutation and `MissingDependency` errors before composition
/// begins.
#[derive(Error, Debug)]
pub enum SprigError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    User(String),

    /// Service configuration or add-on selection was rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A required external tool is not installed.
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// The template could not be composed (missing anchor, filename
    /// collision, missing source file). The target tree is left in its
    /// last-known-consistent state or cleaned up when safe.
    #[error("Composition failed: {0}")]
    Composition(String),

    /// An external tool exited non-zero. Work already on disk is preserved
    /// for inspection.
    #[error("{tool} failed (exit code {code}): {message}")]
    Tool {
        tool: String,
        code: i32,
        message: String,
    },
}

impl SprigError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SprigError::User(_) => exit_codes::USER_ERROR,
            SprigError::Validation(_) => exit_codes::VALIDATION_FAILURE,
            SprigError::MissingDependency(_) => exit_codes::MISSING_DEPENDENCY,
            SprigError::Composition(_) => exit_codes::COMPOSITION_FAILURE,
            SprigError::Tool { .. } => exit_codes::TOOL_FAILURE,
        }
    }
}

/// Result type alias for sprig operations.
pub type Result<T> = std::result::Result<T, SprigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = SprigError::User("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn validation_error_has_correct_exit_code() {
        let err = SprigError::Validation("name does not match pattern".to_string());
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_FAILURE);
    }

    #[test]
    fn missing_dependency_has_correct_exit_code() {
        let err = SprigError::MissingDependency("git is not installed".to_string());
        assert_eq!(err.exit_code(), exit_codes::MISSING_DEPENDENCY);
    }

    #[test]
    fn composition_error_has_correct_exit_code() {
        let err = SprigError::Composition("anchor not found".to_string());
        assert_eq!(err.exit_code(), exit_codes::COMPOSITION_FAILURE);
    }

    #[test]
    fn tool_error_has_correct_exit_code() {
        let err = SprigError::Tool {
            tool: "git".to_string(),
            code: 128,
            message: "clone failed".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::TOOL_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = SprigError::Validation("port 80 is below 1024".to_string());
        assert_eq!(err.to_string(), "Validation failed: port 80 is below 1024");

        let err = SprigError::Tool {
            tool: "gh".to_string(),
            code: 4,
            message: "not logged in".to_string(),
        };
        assert_eq!(err.to_string(), "gh failed (exit code 4): not logged in");
    }
}
