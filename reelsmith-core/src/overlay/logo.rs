// ============================================================================
// reelsmith-core/src/overlay/logo.rs
// ============================================================================
//
// LOGO OUTRO: crossfades a still logo onto the end of a rendered clip
//
// Two encoder runs:
// 1. the logo image becomes a short `<stem>_logo.<ext>` clip
// 2. the clip and the logo clip are joined with an `xfade` filter into
//    `<stem>_final.<ext>`

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer};

use crate::error::CoreResult;
use crate::external::{EncoderCommand, FfmpegSpawner};
use crate::transcode::spawn_and_supervise;

/// Length of the rendered logo clip, in seconds.
pub const LOGO_CLIP_SECS: u32 = 3;
/// Length of the crossfade, in seconds.
pub const XFADE_DURATION: f64 = 0.5;

pub const ERR_LOGO_CLIP: &str = "ffmpeg returned non-zero exit code while rendering the logo clip";
pub const ERR_LOGO_COMBINE: &str = "ffmpeg returned non-zero exit code while combining the logo";

/// Transitions understood by the `xfade` filter.
pub const TRANSITIONS: [&str; 43] = [
    "fade",
    "wipeleft",
    "wiperight",
    "wipeup",
    "wipedown",
    "slideleft",
    "slideright",
    "slideup",
    "slidedown",
    "circlecrop",
    "rectcrop",
    "distance",
    "fadeblack",
    "fadewhite",
    "radial",
    "smoothleft",
    "smoothright",
    "smoothup",
    "smoothdown",
    "circleopen",
    "circleclose",
    "vertopen",
    "vertclose",
    "horzopen",
    "horzclose",
    "dissolve",
    "pixelize",
    "diagtl",
    "diagtr",
    "diagbl",
    "diagbr",
    "hlslice",
    "hrslice",
    "vuslice",
    "vdslice",
    "hblur",
    "fadegrays",
    "wipetl",
    "wipetr",
    "wipebl",
    "wipebr",
    "squeezeh",
    "squeezev",
];

/// An `xfade` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Named(&'static str),
    /// A transition drawn uniformly from [`TRANSITIONS`] at each use
    Random,
}

impl Default for Transition {
    fn default() -> Self {
        Self::Named(TRANSITIONS[0])
    }
}

impl Transition {
    /// Parses a transition name. Unknown names fall back to `fade`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("random") {
            return Self::Random;
        }
        match TRANSITIONS.iter().find(|t| t.eq_ignore_ascii_case(name)) {
            Some(known) => Self::Named(*known),
            None => {
                log::debug!("Unknown transition '{name}', using fade");
                Self::default()
            }
        }
    }

    /// The concrete transition name, drawing from `rng` for [`Transition::Random`].
    pub fn name_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        match self {
            Self::Named(name) => *name,
            Self::Random => TRANSITIONS.choose(rng).copied().unwrap_or(TRANSITIONS[0]),
        }
    }

    /// The concrete transition name, using the thread-local generator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name_with(&mut rand::thread_rng())
    }
}

impl From<String> for Transition {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Transition {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl<'de> Deserialize<'de> for Transition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Logo appended to the end of a clip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogoOutro {
    pub path: PathBuf,
    #[serde(default)]
    pub transition: Transition,
}

/// Artifacts and diagnostics of a logo combination.
#[derive(Debug)]
pub struct OutroRun {
    /// The combined clip
    pub output: PathBuf,
    /// Causes recorded along the way
    pub errors: Vec<String>,
    /// Diagnostic output of both encoder runs
    pub diagnostics: String,
}

impl LogoOutro {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, transition: Transition) -> Self {
        Self {
            path: path.into(),
            transition,
        }
    }

    /// `<stem>_logo.<ext>` next to `video`.
    #[must_use]
    pub fn logo_clip_path(video: &Path) -> PathBuf {
        sibling_with_suffix(video, "_logo")
    }

    /// `<stem>_final.<ext>` next to `video`.
    #[must_use]
    pub fn final_path(video: &Path) -> PathBuf {
        sibling_with_suffix(video, "_final")
    }

    /// Renders the logo image into a short clip.
    #[must_use]
    pub fn logo_clip_command(&self, ffmpeg: &Path, video: &Path) -> EncoderCommand {
        EncoderCommand::new(
            ffmpeg,
            vec![
                "-y".to_string(),
                "-loop".to_string(),
                "1".to_string(),
                "-t".to_string(),
                LOGO_CLIP_SECS.to_string(),
                "-i".to_string(),
                self.path.to_string_lossy().into_owned(),
                Self::logo_clip_path(video).to_string_lossy().into_owned(),
            ],
        )
    }

    /// Crossfades the logo clip onto the end of `video`.
    #[must_use]
    pub fn combine_command(
        &self,
        ffmpeg: &Path,
        video: &Path,
        clip_duration: f64,
        transition: &str,
    ) -> EncoderCommand {
        let offset = (clip_duration - XFADE_DURATION).max(0.0);
        EncoderCommand::new(
            ffmpeg,
            vec![
                "-y".to_string(),
                "-i".to_string(),
                video.to_string_lossy().into_owned(),
                "-i".to_string(),
                Self::logo_clip_path(video).to_string_lossy().into_owned(),
                "-filter_complex".to_string(),
                format!("xfade=transition={transition}:duration={XFADE_DURATION}:offset={offset}"),
                Self::final_path(video).to_string_lossy().into_owned(),
            ],
        )
    }

    /// Runs both encoder steps for a `clip_duration`-second `video`.
    pub fn combine<S>(
        &self,
        ffmpeg: &Path,
        spawner: &S,
        video: &Path,
        clip_duration: f64,
        timeout: Option<Duration>,
    ) -> CoreResult<OutroRun>
    where
        S: FfmpegSpawner + ?Sized,
    {
        let mut errors = Vec::new();
        let mut diagnostics = String::new();

        let logo_cmd = self.logo_clip_command(ffmpeg, video);
        log::info!("Running logo...\n{logo_cmd}");
        let logo_run = spawn_and_supervise(spawner, &logo_cmd, timeout, None, &mut |_: f64| {})?;
        diagnostics.push_str(&logo_run.output);
        if !logo_run.status.success() {
            errors.push(ERR_LOGO_CLIP.to_string());
        }

        let transition = self.transition.name();
        let combine_cmd = self.combine_command(ffmpeg, video, clip_duration, transition);
        log::info!("Running combine...\n{combine_cmd}");
        let combine_run = spawn_and_supervise(spawner, &combine_cmd, timeout, None, &mut |_: f64| {})?;
        diagnostics.push_str(&combine_run.output);
        if !combine_run.status.success() {
            errors.push(ERR_LOGO_COMBINE.to_string());
        }

        Ok(OutroRun {
            output: Self::final_path(video),
            errors,
            diagnostics,
        })
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}
