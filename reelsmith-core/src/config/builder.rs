// ============================================================================
// reelsmith-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig with the library defaults filled in.

use std::path::PathBuf;
use std::time::Duration;

use super::{CoreConfig, timeout_from_secs};
use crate::error::CoreResult;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use reelsmith_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path("/usr/local/bin/ffmpeg")
///     .ffprobe_path("/usr/local/bin/ffprobe")
///     .timeout(None)
///     .build();
/// assert!(config.timeout.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CoreConfig::default(),
        }
    }

    /// Starts from an existing configuration.
    #[must_use]
    pub fn from_config(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Sets the ffmpeg binary path.
    #[must_use]
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffmpeg_path = Some(path.into());
        self
    }

    /// Sets the ffprobe binary path.
    #[must_use]
    pub fn ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ffprobe_path = Some(path.into());
        self
    }

    /// Sets the per-read timeout. `None` disables it.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the per-read timeout from a number of seconds. Zero disables it;
    /// negative, non-finite or out-of-range values are rejected.
    pub fn timeout_secs(self, secs: f64) -> CoreResult<Self> {
        let timeout = timeout_from_secs(secs)?;
        Ok(self.timeout(timeout))
    }

    /// Sets the maximum number of redirects followed for remote inputs.
    #[must_use]
    pub fn max_http_redirect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_http_redirect_attempts = attempts;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
