// reelsmith-cli/src/config.rs
//
// Builds the core configuration from the layered sources the CLI accepts:
// an optional JSON file, then REELSMITH_* environment variables, then
// command-line flags.

use crate::cli::GlobalArgs;
use crate::error::CliResult;
use reelsmith_core::config::{CoreConfig, CoreConfigBuilder};

/// Resolves the effective [`CoreConfig`] for one invocation.
///
/// Explicitly configured binaries are checked for executability here so a
/// bad `--ffmpeg` fails before any work starts.
pub fn build_core_config(global: &GlobalArgs) -> CliResult<CoreConfig> {
    let mut base = match &global.config {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            CoreConfig::from_json_file(path)?
        }
        None => CoreConfig::new(),
    };
    base.apply_env();

    let mut builder = CoreConfigBuilder::from_config(base);
    if let Some(ffmpeg) = &global.ffmpeg {
        builder = builder.ffmpeg_path(ffmpeg);
    }
    if let Some(ffprobe) = &global.ffprobe {
        builder = builder.ffprobe_path(ffprobe);
    }
    if let Some(secs) = global.timeout {
        builder = builder.timeout_secs(secs)?;
    }
    if let Some(limit) = global.max_redirects {
        builder = builder.max_http_redirect_attempts(limit);
    }

    let config = builder.build();
    config.validate()?;
    log::debug!("Effective configuration: {config:?}");
    Ok(config)
}
