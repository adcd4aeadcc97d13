//! Error types for reelsmith-core.
//!
//! Every fallible operation in the crate returns [`CoreResult`]. Errors fall
//! into a few groups: binaries that cannot be found or run, malformed option
//! input, a hung encoder process, and failed encodes. A failed encode folds
//! every recorded cause into one [`CoreError::EncodingFailed`].

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Custom error types for reelsmith-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("the {0} binary could not be found in PATH")]
    DependencyNotFound(String),

    #[error("the binary '{0}' is not executable")]
    NotExecutable(PathBuf),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Failed to wait for command '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("Command '{0}' failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Process hung after {}s without output. Full output: {output}", timeout.as_secs_f64())]
    ProcessHung { timeout: Duration, output: String },

    #[error("Failed encoding. Errors: {}. Full output: {output}", errors.join(", "))]
    EncodingFailed { errors: Vec<String>, output: String },

    #[error("Too many redirects ({limit}) while resolving {url}")]
    TooManyRedirects { url: String, limit: u32 },

    #[error("Remote input error: {0}")]
    RemoteInput(String),

    #[error("ffprobe parse error: {0}")]
    FfprobeParse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for reelsmith-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Returns the captured diagnostic output for errors that carry one.
    #[must_use]
    pub fn diagnostic_output(&self) -> Option<&str> {
        match self {
            Self::ProcessHung { output, .. } | Self::EncodingFailed { output, .. } => {
                Some(output)
            }
            _ => None,
        }
    }
}

pub(crate) fn command_start_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub(crate) fn command_wait_error(cmd: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

pub(crate) fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_failed_lists_every_cause() {
        let err = CoreError::EncodingFailed {
            errors: vec![
                "ffmpeg returned non-zero exit code".to_string(),
                "no output file created".to_string(),
            ],
            output: "frame=1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed encoding. Errors: ffmpeg returned non-zero exit code, no output file created. Full output: frame=1"
        );
        assert_eq!(err.diagnostic_output(), Some("frame=1"));
    }

    #[test]
    fn test_process_hung_includes_partial_output() {
        let err = CoreError::ProcessHung {
            timeout: Duration::from_millis(1500),
            output: "time=00:00:01.00".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.5s"));
        assert!(msg.contains("time=00:00:01.00"));
    }
}
