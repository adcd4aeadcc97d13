// ============================================================================
// reelsmith-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg and ffprobe binaries
//
// This module encapsulates everything that touches the two external
// executables: locating them, spawning the encoder, and running the probe
// tool. Spawning and probing sit behind traits so jobs can be driven by
// scripted processes in tests.
//
// KEY COMPONENTS:
// - Binary lookup on PATH (with PATHEXT on Windows)
// - FfmpegSpawner / FfmpegProcess traits and the ffmpeg-sidecar implementation
// - FfprobeExecutor trait and the command-backed implementation

use crate::error::{CoreError, CoreResult};

use std::env;
use std::path::{Path, PathBuf};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Encoder command assembly result and process spawning
pub mod ffmpeg_executor;

/// Probe tool execution and output parsing
pub mod ffprobe_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{EncoderCommand, FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor, ProbeOutputFormat};

// ============================================================================
// BINARY LOOKUP
// ============================================================================

/// Returns true when `path` is a regular file the current user may execute.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Cross-platform lookup of an executable on `PATH`.
///
/// On Windows every extension listed in `PATHEXT` is tried as well.
pub fn which(cmd: &str) -> CoreResult<PathBuf> {
    let exts: Vec<String> = match env::var("PATHEXT") {
        Ok(pathext) => std::iter::once(String::new())
            .chain(pathext.split(';').filter(|e| !e.is_empty()).map(str::to_string))
            .collect(),
        Err(_) => vec![String::new()],
    };

    let path_var = env::var_os("PATH").unwrap_or_default();
    for dir in env::split_paths(&path_var) {
        for ext in &exts {
            let candidate = dir.join(format!("{cmd}{ext}"));
            if is_executable(&candidate) {
                log::debug!("Found {} at {}", cmd, candidate.display());
                return Ok(candidate);
            }
        }
    }

    log::warn!("Dependency '{}' not found on PATH.", cmd);
    Err(CoreError::DependencyNotFound(cmd.to_string()))
}
