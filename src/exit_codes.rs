//! Exit code constants for the sprig CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid state)
//! - 2: Validation failure (service config or add-on selection rejected)
//! - 3: Missing external dependency (required tool not installed)
//! - 4: Composition failure (anchor not found, filename collision, ...)
//! - 5: External tool failure (git/gh/hook exited non-zero)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid state.
pub const USER_ERROR: i32 = 1;

/// Validation failure: service configuration or add-on selection rejected.
pub const VALIDATION_FAILURE: i32 = 2;

/// A required external tool is not installed.
pub const MISSING_DEPENDENCY: i32 = 3;

/// Composition failure: the template could not be composed.
pub const COMPOSITION_FAILURE: i32 = 4;

/// An external tool (git, gh, post-compose hook) exited non-zero.
pub const TOOL_FAILURE: i32 = 5;
