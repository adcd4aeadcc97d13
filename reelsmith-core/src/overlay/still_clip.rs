//! Still-image clips: an image looped for a fixed duration, with text on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{EncoderCommand, FfmpegSpawner, FfprobeExecutor};
use crate::media::MediaDescriptor;
use crate::options::{EncodingOptions, OptionSet};
use crate::transcode::spawn_and_supervise;
use crate::transcode::validator::{ERR_NON_ZERO_EXIT, validate_output};

use super::logo::LogoOutro;
use super::text::{TextOverlay, encode_text_filters};

/// Default clip length in seconds.
pub const DEFAULT_CLIP_SECS: f64 = 5.0;

/// Renders one image into a video clip.
///
/// # Examples
///
/// ```rust
/// use reelsmith_core::overlay::{StillImageClip, TextOverlay};
///
/// let clip = StillImageClip::new("card.png", "card.mp4")
///     .text(TextOverlay::new("Hello"))
///     .duration(3.0);
/// assert_eq!(clip.clip_duration(), 3.0);
/// ```
#[derive(Debug, Clone)]
pub struct StillImageClip {
    image: PathBuf,
    output: PathBuf,
    duration: f64,
    texts: Vec<TextOverlay>,
    options: OptionSet,
    input_options: OptionSet,
    logo: Option<LogoOutro>,
    validate: bool,
    timeout_override: Option<Duration>,
}

impl StillImageClip {
    #[must_use]
    pub fn new(image: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            output: output.into(),
            duration: DEFAULT_CLIP_SECS,
            texts: Vec::new(),
            options: OptionSet::default(),
            input_options: OptionSet::Mapped(EncodingOptions::passthrough()),
            logo: None,
            validate: true,
            timeout_override: None,
        }
    }

    #[must_use]
    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    #[must_use]
    pub fn text(mut self, text: TextOverlay) -> Self {
        self.texts.push(text);
        self
    }

    #[must_use]
    pub fn texts(mut self, texts: impl IntoIterator<Item = TextOverlay>) -> Self {
        self.texts.extend(texts);
        self
    }

    /// Output options, emitted after the text filters.
    #[must_use]
    pub fn options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn input_options(mut self, options: OptionSet) -> Self {
        self.input_options = options;
        self
    }

    #[must_use]
    pub fn logo(mut self, logo: LogoOutro) -> Self {
        self.logo = Some(logo);
        self
    }

    #[must_use]
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Replaces the configured read timeout; `Duration::ZERO` disables it.
    #[must_use]
    pub fn timeout_override(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    #[must_use]
    pub fn clip_duration(&self) -> f64 {
        self.duration
    }

    /// Path of the artifact the job finally produces.
    #[must_use]
    pub fn final_output(&self) -> PathBuf {
        match self.logo {
            Some(_) => LogoOutro::final_path(&self.output),
            None => self.output.clone(),
        }
    }

    /// Assembles `<ffmpeg> -y [input-options] -loop 1 -t <d> -i <image> [texts] [options] <output>`.
    pub fn command(&self, config: &CoreConfig) -> CoreResult<EncoderCommand> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(CoreError::InvalidOptions(format!(
                "clip duration must be positive, got {}",
                self.duration
            )));
        }
        let program = config.resolve_ffmpeg()?;

        let mut args = vec!["-y".to_string()];
        args.extend(self.input_options.to_args()?);
        args.extend([
            "-loop".to_string(),
            "1".to_string(),
            "-t".to_string(),
            self.duration.to_string(),
            "-i".to_string(),
            self.image.to_string_lossy().into_owned(),
        ]);
        args.extend(encode_text_filters(&self.texts));
        args.extend(self.options.to_args()?);
        args.push(self.output.to_string_lossy().into_owned());

        Ok(EncoderCommand::new(program, args))
    }

    fn effective_timeout(&self, config: &CoreConfig) -> Option<Duration> {
        match self.timeout_override {
            Some(timeout) if timeout.is_zero() => None,
            Some(timeout) => Some(timeout),
            None => config.timeout,
        }
    }

    /// Renders the clip, appends the logo outro if configured, and validates
    /// the final artifact.
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
        let timeout = self.effective_timeout(config);

        log::info!("Running transcoding...\n{cmd}");
        progress(0.0);

        let run = spawn_and_supervise(spawner, &cmd, timeout, Some(self.duration), &mut progress)?;
        let mut output = run.output;
        let mut errors = Vec::new();
        if !run.status.success() {
            errors.push(ERR_NON_ZERO_EXIT.to_string());
        }

        let mut final_output = self.output.clone();
        if let Some(logo) = &self.logo {
            let outro = logo.combine(&cmd.program, spawner, &self.output, self.duration, timeout)?;
            output.push_str(&outro.diagnostics);
            errors.extend(outro.errors);
            final_output = outro.output;
        }

        if !self.validate {
            if !errors.is_empty() {
                log::warn!(
                    "Validation disabled; ignoring errors for {}: {}",
                    final_output.display(),
                    errors.join(", ")
                );
            }
            return Ok(None);
        }

        match validate_output(&final_output, errors, prober, output) {
            Ok(media) => {
                progress(1.0);
                log::info!(
                    "Transcoding of {} to {} succeeded",
                    self.image.display(),
                    final_output.display()
                );
                Ok(Some(media))
            }
            Err(err) => {
                log::error!("Failed encoding...\n{cmd}\n{err}");
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn image(&self) -> &Path {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfigBuilder;
    use crate::overlay::Transition;

    fn config() -> CoreConfig {
        CoreConfigBuilder::new().ffmpeg_path("/bin/sh").build()
    }

    #[test]
    fn test_command_shape() {
        let clip = StillImageClip::new("card.png", "card.mp4")
            .text(TextOverlay::new("Hi").font_size(30))
            .options(OptionSet::mapped(
                EncodingOptions::new()
                    .with("video_codec", "libx264")
                    .with("pixel_format", "yuv420p"),
            ));
        let cmd = clip.command(&config()).unwrap();
        assert_eq!(&cmd.args[..7], ["-y", "-loop", "1", "-t", "5", "-i", "card.png"]);
        assert_eq!(cmd.args[7], "-vf");
        assert!(cmd.args[8].starts_with("[in]drawtext="));
        assert_eq!(
            &cmd.args[9..],
            ["-vcodec", "libx264", "-pix_fmt", "yuv420p", "card.mp4"]
        );
    }

    #[test]
    fn test_input_options_precede_loop() {
        let clip = StillImageClip::new("card.png", "card.mp4")
            .duration(2.5)
            .input_options(OptionSet::raw(["-framerate", "25"]));
        let cmd = clip.command(&config()).unwrap();
        assert_eq!(
            cmd.args,
            vec!["-y", "-framerate", "25", "-loop", "1", "-t", "2.5", "-i", "card.png", "card.mp4"]
        );
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let clip = StillImageClip::new("card.png", "card.mp4").duration(0.0);
        assert!(matches!(
            clip.command(&config()),
            Err(CoreError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_final_output_with_logo() {
        let clip = StillImageClip::new("card.png", "out/card.mp4");
        assert_eq!(clip.final_output(), PathBuf::from("out/card.mp4"));
        let with_logo = clip.logo(LogoOutro::new("logo.png", Transition::Random));
        assert_eq!(with_logo.final_output(), PathBuf::from("out/card_final.mp4"));
    }
}
