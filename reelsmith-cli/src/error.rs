// ============================================================================
// reelsmith-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and exit-code mapping
//
// Commands return the core error type directly. The binary prints the error
// and exits with EXIT_FAILURE for every kind.

use reelsmith_core::CoreError;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = reelsmith_core::CoreResult<T>;

/// Process exit code for any failed command.
pub const EXIT_FAILURE: i32 = 1;

/// Maps an error to the process exit code.
#[must_use]
pub fn exit_code(_err: &CoreError) -> i32 {
    EXIT_FAILURE
}

/// Builds a CLI-level error for bad flag combinations or values.
#[must_use]
pub fn usage_error(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidOptions(msg.into())
}
