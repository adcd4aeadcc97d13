//! FFprobe integration for media analysis
//!
//! Runs the configured probe binary on a path or URL and turns its output
//! into a [`MediaDescriptor`]. JSON output is the default; the sectioned
//! `key=value` style is available for older tool versions.

use crate::config::CoreConfig;
use crate::error::{CoreResult, command_failed_error, command_start_error};
use crate::media::{MediaDescriptor, parse_json, parse_key_value};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Output style requested from the probe tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeOutputFormat {
    /// `-print_format json`
    #[default]
    Json,
    /// The default sectioned `key=value` writer
    KeyValue,
}

/// Trait for anything that can describe a media file.
pub trait FfprobeExecutor {
    /// Probes `input`, which may be a local path or a URL.
    fn probe(&self, input: &str) -> CoreResult<MediaDescriptor>;
}

/// `FfprobeExecutor` that runs the probe binary as a subprocess.
#[derive(Debug, Clone)]
pub struct CommandFfprobeExecutor {
    binary: PathBuf,
    format: ProbeOutputFormat,
}

impl CommandFfprobeExecutor {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            format: ProbeOutputFormat::default(),
        }
    }

    /// Resolves the probe binary from the configuration.
    pub fn from_config(config: &CoreConfig) -> CoreResult<Self> {
        Ok(Self::new(config.resolve_ffprobe()?))
    }

    #[must_use]
    pub fn with_output_format(mut self, format: ProbeOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Arguments passed to the probe binary for `input`.
    #[must_use]
    pub fn probe_args(&self, input: &str) -> Vec<String> {
        let mut args = vec!["-v".to_string(), "quiet".to_string()];
        if self.format == ProbeOutputFormat::Json {
            args.extend(["-print_format".to_string(), "json".to_string()]);
        }
        args.extend([
            "-show_format".to_string(),
            "-show_streams".to_string(),
            input.to_string(),
        ]);
        args
    }
}

impl FfprobeExecutor for CommandFfprobeExecutor {
    fn probe(&self, input: &str) -> CoreResult<MediaDescriptor> {
        log::debug!(
            "Running ffprobe ({}) on: {}",
            self.binary.display(),
            input
        );

        let output = Command::new(&self.binary)
            .args(self.probe_args(input))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| command_start_error("ffprobe", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = match self.format {
            ProbeOutputFormat::Json => parse_json(&stdout),
            ProbeOutputFormat::KeyValue => parse_key_value(&stdout),
        };

        match parsed {
            Ok(probe) if output.status.success() => Ok(MediaDescriptor::from_probe(input, &probe)),
            Ok(_) => {
                log::debug!(
                    "ffprobe exited with {} for {}; treating as invalid media",
                    output.status,
                    input
                );
                Ok(MediaDescriptor::invalid(input))
            }
            Err(err) if output.status.success() => {
                log::error!("Failed to parse ffprobe output for {input}: {err}");
                Err(err)
            }
            Err(_) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                log::error!("ffprobe failed for {input}: {stderr}");
                Err(command_failed_error("ffprobe", output.status, stderr))
            }
        }
    }
}
