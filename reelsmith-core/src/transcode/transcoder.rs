//! One transcode job, from command assembly to validated output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::external::{EncoderCommand, FfmpegSpawner, FfprobeExecutor};
use crate::media::MediaDescriptor;
use crate::options::{EncodingOptions, OptionSet};
use crate::remote::is_remote;

use super::aspect::{self, PreserveAspect};
use super::supervisor::spawn_and_supervise;
use super::validator::{ERR_NON_ZERO_EXIT, validate_output};

/// Where a job reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeInput {
    Path(PathBuf),
    Url(String),
    /// A probed file; enables progress and aspect adjustment
    Media(MediaDescriptor),
}

impl TranscodeInput {
    /// Location passed to `-i`.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Path(path) => path.to_string_lossy().into_owned(),
            Self::Url(url) => url.clone(),
            Self::Media(media) => media.path.clone(),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<&MediaDescriptor> {
        match self {
            Self::Media(media) => Some(media),
            _ => None,
        }
    }
}

impl From<&str> for TranscodeInput {
    fn from(value: &str) -> Self {
        if is_remote(value) {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl From<PathBuf> for TranscodeInput {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<MediaDescriptor> for TranscodeInput {
    fn from(value: MediaDescriptor) -> Self {
        Self::Media(value)
    }
}

/// Per-job behaviour switches.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscoderOptions {
    /// Re-probe the output and fail on any recorded error
    pub validate: bool,
    pub preserve_aspect_ratio: Option<PreserveAspect>,
    /// Replaces the input location passed to `-i`
    pub input_override: Option<String>,
    /// Emitted before `-i`
    pub input_options: OptionSet,
    /// Replaces the configured read timeout; `Duration::ZERO` disables it
    pub timeout_override: Option<Duration>,
}

impl Default for TranscoderOptions {
    fn default() -> Self {
        Self {
            validate: true,
            preserve_aspect_ratio: None,
            input_override: None,
            input_options: OptionSet::Mapped(EncodingOptions::passthrough()),
            timeout_override: None,
        }
    }
}

impl TranscoderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    #[must_use]
    pub fn preserve_aspect_ratio(mut self, by: PreserveAspect) -> Self {
        self.preserve_aspect_ratio = Some(by);
        self
    }

    #[must_use]
    pub fn input_override(mut self, input: impl Into<String>) -> Self {
        self.input_override = Some(input.into());
        self
    }

    #[must_use]
    pub fn input_options(mut self, options: OptionSet) -> Self {
        self.input_options = options;
        self
    }

    #[must_use]
    pub fn timeout_override(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    /// Effective read timeout given the process configuration.
    #[must_use]
    pub fn effective_timeout(&self, config: &CoreConfig) -> Option<Duration> {
        match self.timeout_override {
            Some(timeout) if timeout.is_zero() => None,
            Some(timeout) => Some(timeout),
            None => config.timeout,
        }
    }
}

/// A prepared transcode job.
///
/// # Examples
///
/// ```rust
/// use reelsmith_core::config::CoreConfigBuilder;
/// use reelsmith_core::options::{EncodingOptions, OptionSet};
/// use reelsmith_core::transcode::{Transcoder, TranscoderOptions};
///
/// let config = CoreConfigBuilder::new().ffmpeg_path("/bin/sh").build();
/// let job = Transcoder::new(
///     "in.mov",
///     "out.mp4",
///     OptionSet::mapped(EncodingOptions::new().with("video_codec", "libx264")),
///     TranscoderOptions::new(),
/// )
/// .unwrap();
///
/// let cmd = job.command(&config).unwrap();
/// assert_eq!(cmd.args, vec!["-y", "-i", "in.mov", "-vcodec", "libx264", "out.mp4"]);
/// ```
#[derive(Debug, Clone)]
pub struct Transcoder {
    input: TranscodeInput,
    output: PathBuf,
    options: OptionSet,
    transcoder_options: TranscoderOptions,
    duration_hint: Option<f64>,
}

impl Transcoder {
    /// Prepares a job.
    ///
    /// A screenshot's output seek moves to the input side, and the requested
    /// resolution is adjusted when aspect preservation is enabled.
    pub fn new(
        input: impl Into<TranscodeInput>,
        output: impl Into<PathBuf>,
        mut options: OptionSet,
        mut transcoder_options: TranscoderOptions,
    ) -> CoreResult<Self> {
        let input = input.into();

        if let Some(seek) = options.take_screenshot_seek()? {
            log::debug!("Moving screenshot seek {seek} to the input side");
            transcoder_options.input_options.set_seek(&seek);
        }

        if let Some(by) = transcoder_options.preserve_aspect_ratio {
            apply_aspect(&input, &mut options, by);
        }

        Ok(Self {
            input,
            output: output.into(),
            options,
            transcoder_options,
            duration_hint: None,
        })
    }

    /// Total duration used for progress when the input is not a probed file.
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_hint = Some(seconds);
        self
    }

    #[must_use]
    pub fn input(&self) -> &TranscodeInput {
        &self.input
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    #[must_use]
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    #[must_use]
    pub fn transcoder_options(&self) -> &TranscoderOptions {
        &self.transcoder_options
    }

    /// Duration in seconds used to turn progress positions into fractions.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.duration_hint
            .or_else(|| self.input.descriptor().and_then(|m| m.duration))
    }

    /// Assembles `<ffmpeg> -y [input-options] -i <input> [options] <output>`.
    pub fn command(&self, config: &CoreConfig) -> CoreResult<EncoderCommand> {
        let program = config.resolve_ffmpeg()?;
        let input = self
            .transcoder_options
            .input_override
            .clone()
            .unwrap_or_else(|| self.input.location());

        let mut args = vec!["-y".to_string()];
        args.extend(self.transcoder_options.input_options.to_args()?);
        args.push("-i".to_string());
        args.push(input);
        args.extend(self.options.to_args()?);
        args.push(self.output.to_string_lossy().into_owned());

        Ok(EncoderCommand::new(program, args))
    }

    /// Runs the job.
    ///
    /// `progress` receives 0.0 up front, intermediate fractions when the
    /// duration is known, and 1.0 only after the output validated. Returns
    /// `Ok(None)` when validation is disabled.
    pub fn run<S, P, F>(
        &self,
        config: &CoreConfig,
        spawner: &S,
        prober: &P,
        mut progress: F,
    ) -> CoreResult<Option<MediaDescriptor>>
    where
        S: FfmpegSpawner + ?Sized,
        P: FfprobeExecutor + ?Sized,
        F: FnMut(f64),
    {
        let cmd = self.command(config)?;
        let timeout = self.transcoder_options.effective_timeout(config);

        log::info!("Running transcoding...\n{cmd}");
        progress(0.0);

        let run = spawn_and_supervise(spawner, &cmd, timeout, self.duration(), &mut progress)?;

        let mut errors = Vec::new();
        if !run.status.success() {
            errors.push(ERR_NON_ZERO_EXIT.to_string());
        }

        if !self.transcoder_options.validate {
            if !errors.is_empty() {
                log::warn!(
                    "Validation disabled; ignoring errors for {}: {}",
                    self.output.display(),
                    errors.join(", ")
                );
            }
            return Ok(None);
        }

        match validate_output(&self.output, errors, prober, run.output) {
            Ok(media) => {
                progress(1.0);
                log::info!(
                    "Transcoding of {} to {} succeeded",
                    self.input.location(),
                    self.output.display()
                );
                Ok(Some(media))
            }
            Err(err) => {
                log::error!("Failed encoding...\n{cmd}\n{err}");
                Err(err)
            }
        }
    }
}

fn apply_aspect(input: &TranscodeInput, options: &mut OptionSet, by: PreserveAspect) {
    let Some(ratio) = input.descriptor().and_then(MediaDescriptor::calculated_aspect_ratio) else {
        log::debug!("Aspect preservation skipped: input has no known aspect ratio");
        return;
    };
    match options {
        OptionSet::Mapped(mapped) => {
            aspect::apply(mapped, ratio, by);
        }
        OptionSet::Raw(_) => {
            log::debug!("Aspect preservation skipped: raw options are passed verbatim");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;
    use crate::options::OptionValue;

    fn config() -> CoreConfig {
        CoreConfigBuilder::new().ffmpeg_path("/bin/sh").build()
    }

    fn probed(duration: f64, width: u32, height: u32) -> MediaDescriptor {
        let json = format!(
            r#"{{ "streams": [ {{ "codec_type": "video", "width": {width}, "height": {height} }} ],
                "format": {{ "duration": "{duration}" }} }}"#
        );
        MediaDescriptor::from_probe("source.mov", &crate::media::parse_json(&json).unwrap())
    }

    #[test]
    fn test_command_shape_with_input_options() {
        let job = Transcoder::new(
            "in.mov",
            "out.mp4",
            OptionSet::raw(["-c:v", "libx264"]),
            TranscoderOptions::new()
                .input_options(OptionSet::raw(["-ss", "2", "-re"])),
        )
        .unwrap();
        let cmd = job.command(&config()).unwrap();
        assert_eq!(cmd.program, PathBuf::from("/bin/sh"));
        assert_eq!(
            cmd.args,
            vec!["-y", "-ss", "2", "-re", "-i", "in.mov", "-c:v", "libx264", "out.mp4"]
        );
    }

    #[test]
    fn test_input_override() {
        let job = Transcoder::new(
            probed(10.0, 640, 480),
            "out.mp4",
            OptionSet::default(),
            TranscoderOptions::new().input_override("concat.txt"),
        )
        .unwrap();
        let cmd = job.command(&config()).unwrap();
        assert_eq!(cmd.args, vec!["-y", "-i", "concat.txt", "out.mp4"]);
    }

    #[test]
    fn test_screenshot_seek_moves_to_input() {
        let job = Transcoder::new(
            "in.mov",
            "thumb.jpg",
            OptionSet::mapped(
                EncodingOptions::new()
                    .with("seek_time", 3)
                    .with("screenshot", true)
                    .with("resolution", "320x180"),
            ),
            TranscoderOptions::new(),
        )
        .unwrap();
        let cmd = job.command(&config()).unwrap();
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-ss", "3", "-i", "in.mov", "-vframes", "1", "-f", "image2", "-s",
                "320x180", "thumb.jpg"
            ]
        );
    }

    #[test]
    fn test_preserve_aspect_by_width() {
        let job = Transcoder::new(
            probed(10.0, 1920, 1080),
            "out.mp4",
            OptionSet::mapped(EncodingOptions::new().with("resolution", "1000x1000")),
            TranscoderOptions::new().preserve_aspect_ratio(PreserveAspect::Width),
        )
        .unwrap();
        let OptionSet::Mapped(options) = job.options() else {
            panic!("expected mapped options");
        };
        // 1000 / (16/9) = 562.5, rounded to the nearest even number
        assert_eq!(options.get("resolution"), Some(&OptionValue::from("1000x562")));
    }

    #[test]
    fn test_preserve_aspect_noop_for_plain_path() {
        let job = Transcoder::new(
            "in.mov",
            "out.mp4",
            OptionSet::mapped(EncodingOptions::new().with("resolution", "1000x1000")),
            TranscoderOptions::new().preserve_aspect_ratio(PreserveAspect::Height),
        )
        .unwrap();
        assert_eq!(job.command(&config()).unwrap().args[4], "1000x1000");
    }

    #[test]
    fn test_duration_sources() {
        let probed_job = Transcoder::new(
            probed(12.0, 640, 480),
            "out.mp4",
            OptionSet::default(),
            TranscoderOptions::new(),
        )
        .unwrap();
        assert_eq!(probed_job.duration(), Some(12.0));
        assert_eq!(probed_job.with_duration(5.0).duration(), Some(5.0));

        let plain = Transcoder::new("in.mov", "out.mp4", OptionSet::default(), TranscoderOptions::new())
            .unwrap();
        assert_eq!(plain.duration(), None);
    }

    #[test]
    fn test_effective_timeout() {
        let config = CoreConfigBuilder::new()
            .timeout(Some(Duration::from_secs(30)))
            .build();
        assert_eq!(
            TranscoderOptions::new().effective_timeout(&config),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            TranscoderOptions::new()
                .timeout_override(Duration::from_secs(5))
                .effective_timeout(&config),
            Some(Duration::from_secs(5))
        );
        assert_eq!(
            TranscoderOptions::new()
                .timeout_override(Duration::ZERO)
                .effective_timeout(&config),
            None
        );
    }

    #[test]
    fn test_url_input_detected() {
        assert_eq!(
            TranscodeInput::from("https://cdn.test/a.mp4"),
            TranscodeInput::Url("https://cdn.test/a.mp4".to_string())
        );
        assert_eq!(
            TranscodeInput::from("a.mp4"),
            TranscodeInput::Path(PathBuf::from("a.mp4"))
        );
    }
}
