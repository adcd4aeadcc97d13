//! Post-encode validation of the produced artifact.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::external::FfprobeExecutor;
use crate::media::MediaDescriptor;

pub const ERR_NON_ZERO_EXIT: &str = "ffmpeg returned non-zero exit code";
pub const ERR_NO_OUTPUT: &str = "no output file created";
pub const ERR_INVALID_OUTPUT: &str = "encoded file is invalid";

/// Checks that `output_path` exists and probes as valid media.
///
/// A missing file records both [`ERR_NO_OUTPUT`] and [`ERR_INVALID_OUTPUT`].
///
/// `errors` carries causes recorded earlier in the job. Any cause, old or
/// new, turns the result into [`CoreError::EncodingFailed`] with the full
/// diagnostic `output` attached.
pub fn validate_output<P>(
    output_path: &Path,
    mut errors: Vec<String>,
    prober: &P,
    output: String,
) -> CoreResult<MediaDescriptor>
where
    P: FfprobeExecutor + ?Sized,
{
    let mut encoded = None;
    if output_path.exists() {
        match prober.probe(&output_path.to_string_lossy()) {
            Ok(media) if media.is_valid() => encoded = Some(media),
            Ok(_) => errors.push(ERR_INVALID_OUTPUT.to_string()),
            Err(e) => {
                log::debug!("Re-probing {} failed: {e}", output_path.display());
                errors.push(ERR_INVALID_OUTPUT.to_string());
            }
        }
    } else {
        // Nothing to probe, so the artifact is invalid as well.
        errors.push(ERR_NO_OUTPUT.to_string());
        errors.push(ERR_INVALID_OUTPUT.to_string());
    }

    match encoded {
        Some(media) if errors.is_empty() => Ok(media),
        _ => Err(CoreError::EncodingFailed { errors, output }),
    }
}
