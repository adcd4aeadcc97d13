//! Configuration for reelsmith-core.
//!
//! A [`CoreConfig`] names the two external binaries, bounds how long the
//! supervisor waits for each read of the encoder's diagnostic stream, and
//! limits redirect following for remote inputs. It is built once and then
//! passed by reference to every job; nothing in the crate keeps global
//! configuration state.

mod builder;
mod utils;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::external;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default number of seconds the supervisor waits for each diagnostic read.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of HTTP redirects followed for remote inputs.
pub const DEFAULT_MAX_HTTP_REDIRECT_ATTEMPTS: u32 = 10;

/// Environment variable overriding the ffmpeg binary path.
pub const ENV_FFMPEG: &str = "REELSMITH_FFMPEG";
/// Environment variable overriding the ffprobe binary path.
pub const ENV_FFPROBE: &str = "REELSMITH_FFPROBE";
/// Environment variable overriding the read timeout in seconds (0 disables it).
pub const ENV_TIMEOUT: &str = "REELSMITH_TIMEOUT";
/// Environment variable overriding the redirect limit.
pub const ENV_MAX_REDIRECTS: &str = "REELSMITH_MAX_REDIRECTS";

/// Process-level configuration shared by every job.
///
/// # Examples
///
/// ```rust
/// use reelsmith_core::config::CoreConfigBuilder;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .timeout(Some(Duration::from_secs(60)))
///     .max_http_redirect_attempts(3)
///     .build();
/// assert_eq!(config.max_http_redirect_attempts, 3);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Explicit ffmpeg binary; `None` searches `PATH`
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit ffprobe binary; `None` searches `PATH`
    pub ffprobe_path: Option<PathBuf>,

    /// Maximum wait for each read of the encoder's diagnostic stream.
    /// `None` waits forever.
    pub timeout: Option<Duration>,

    /// Maximum redirects followed when resolving a remote input
    pub max_http_redirect_attempts: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_http_redirect_attempts: DEFAULT_MAX_HTTP_REDIRECT_ATTEMPTS,
        }
    }
}

/// On-disk shape of a JSON configuration file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
    timeout_secs: Option<f64>,
    max_http_redirect_attempts: Option<u32>,
}

impl CoreConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from defaults overridden by `REELSMITH_*`
    /// environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Applies `REELSMITH_*` environment overrides on top of this config.
    pub fn apply_env(&mut self) {
        if let Some(path) = utils::get_env_path(ENV_FFMPEG) {
            self.ffmpeg_path = Some(path);
        }
        if let Some(path) = utils::get_env_path(ENV_FFPROBE) {
            self.ffprobe_path = Some(path);
        }
        if let Some(secs) = utils::get_env_f64(ENV_TIMEOUT) {
            match timeout_from_secs(secs) {
                Ok(timeout) => self.timeout = timeout,
                Err(e) => log::warn!("Ignoring {ENV_TIMEOUT}: {e}"),
            }
        }
        self.max_http_redirect_attempts =
            utils::get_env_u32(ENV_MAX_REDIRECTS, self.max_http_redirect_attempts);
    }

    /// Loads a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(contents: &str) -> CoreResult<Self> {
        let file: ConfigFile = serde_json::from_str(contents)
            .map_err(|e| CoreError::Config(format!("Invalid config file: {e}")))?;

        let mut config = Self::default();
        config.ffmpeg_path = file.ffmpeg_path;
        config.ffprobe_path = file.ffprobe_path;
        if let Some(secs) = file.timeout_secs {
            config.timeout = timeout_from_secs(secs)?;
        }
        if let Some(limit) = file.max_http_redirect_attempts {
            config.max_http_redirect_attempts = limit;
        }
        Ok(config)
    }

    /// Checks that explicitly configured binaries are executable files.
    ///
    /// Binaries left to `PATH` lookup are checked when a job resolves them.
    pub fn validate(&self) -> CoreResult<()> {
        for path in [&self.ffmpeg_path, &self.ffprobe_path].into_iter().flatten() {
            if !external::is_executable(path) {
                return Err(CoreError::NotExecutable(path.clone()));
            }
        }
        Ok(())
    }

    /// Returns the ffmpeg binary to run, failing before anything is spawned
    /// when it cannot be found.
    pub fn resolve_ffmpeg(&self) -> CoreResult<PathBuf> {
        resolve_binary(self.ffmpeg_path.as_deref(), "ffmpeg")
    }

    /// Returns the ffprobe binary to run.
    pub fn resolve_ffprobe(&self) -> CoreResult<PathBuf> {
        resolve_binary(self.ffprobe_path.as_deref(), "ffprobe")
    }
}

fn resolve_binary(configured: Option<&Path>, name: &str) -> CoreResult<PathBuf> {
    match configured {
        Some(path) if external::is_executable(path) => Ok(path.to_path_buf()),
        Some(path) => Err(CoreError::NotExecutable(path.to_path_buf())),
        None => external::which(name),
    }
}

/// Converts a seconds value into a read deadline. Zero disables it.
///
/// Negative, non-finite and unrepresentably large values are configuration
/// errors.
pub fn timeout_from_secs(secs: f64) -> CoreResult<Option<Duration>> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(CoreError::Config(format!(
            "timeout must be a non-negative number of seconds, got {secs}"
        )));
    }
    if secs == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|e| CoreError::Config(format!("timeout of {secs} seconds is out of range: {e}")))
}
