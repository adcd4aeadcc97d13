//! Read-only snapshot of a probed media file.

use serde::Serialize;

use super::probe::{ProbeOutput, ProbeStream};

/// Duration, dimensions and codec identifiers of a probed file.
///
/// Created by a probe and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaDescriptor {
    /// Path or URL that was probed
    pub path: String,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub format_name: Option<String>,
    /// Overall bitrate in bits per second
    pub bitrate: Option<u64>,
    /// Size in bytes
    pub size: Option<u64>,

    pub video_codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
    pub display_aspect_ratio: Option<String>,
    /// Rotation in degrees, normalised to 0..360
    pub rotation: Option<u32>,

    pub audio_codec: Option<String>,
    pub audio_sample_rate: Option<u32>,
    pub audio_channels: Option<u32>,

    valid: bool,
}

impl MediaDescriptor {
    /// Builds a descriptor from parsed probe output.
    ///
    /// A descriptor is invalid when the probe reported an error or when the
    /// file has neither a video nor an audio stream.
    #[must_use]
    pub fn from_probe(path: impl Into<String>, probe: &ProbeOutput) -> Self {
        let video = probe.video_stream();
        let audio = probe.audio_stream();
        let format = probe.format.as_ref();

        let duration = format
            .and_then(|f| parse_f64(f.duration.as_deref()))
            .or_else(|| probe.streams.iter().find_map(|s| parse_f64(s.duration.as_deref())));

        Self {
            path: path.into(),
            duration,
            format_name: format.and_then(|f| f.format_name.clone()),
            bitrate: format.and_then(|f| parse_u64(f.bit_rate.as_deref())),
            size: format.and_then(|f| parse_u64(f.size.as_deref())),
            video_codec: video.and_then(|s| s.codec_name.clone()),
            width: video.and_then(|s| positive_u32(s.width)),
            height: video.and_then(|s| positive_u32(s.height)),
            frame_rate: video.and_then(|s| {
                parse_frame_rate(s.r_frame_rate.as_deref())
                    .or_else(|| parse_frame_rate(s.avg_frame_rate.as_deref()))
            }),
            display_aspect_ratio: video.and_then(|s| s.display_aspect_ratio.clone()),
            rotation: video.and_then(stream_rotation),
            audio_codec: audio.and_then(|s| s.codec_name.clone()),
            audio_sample_rate: audio.and_then(|s| {
                s.sample_rate.as_deref().and_then(|r| r.parse::<u32>().ok())
            }),
            audio_channels: audio.and_then(|s| s.channels).and_then(|c| u32::try_from(c).ok()),
            valid: probe.error.is_none() && (video.is_some() || audio.is_some()),
        }
    }

    /// Descriptor for an input the probe could not read at all.
    #[must_use]
    pub fn invalid(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// `WxH` of the video stream, when known.
    #[must_use]
    pub fn resolution(&self) -> Option<String> {
        Some(format!("{}x{}", self.width?, self.height?))
    }

    /// Aspect ratio of the displayed picture.
    ///
    /// Prefers the display aspect ratio reported by the probe and falls back
    /// to width/height. Inverted for 90/270 degree rotations.
    #[must_use]
    pub fn calculated_aspect_ratio(&self) -> Option<f64> {
        let ratio = self
            .aspect_from_dar()
            .or_else(|| self.aspect_from_dimensions())?;
        match self.rotation {
            Some(90 | 270) => Some(1.0 / ratio),
            _ => Some(ratio),
        }
    }

    fn aspect_from_dar(&self) -> Option<f64> {
        let (w, h) = self.display_aspect_ratio.as_deref()?.split_once(':')?;
        let ratio = w.trim().parse::<f64>().ok()? / h.trim().parse::<f64>().ok()?;
        (ratio.is_finite() && ratio > 0.0).then_some(ratio)
    }

    fn aspect_from_dimensions(&self) -> Option<f64> {
        let ratio = f64::from(self.width?) / f64::from(self.height?);
        (ratio.is_finite() && ratio > 0.0).then_some(ratio)
    }
}

fn parse_f64(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_u64(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse::<u64>().ok())
}

fn positive_u32(value: Option<i64>) -> Option<u32> {
    value.filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok())
}

/// Parses `num/den` frame rates such as `30000/1001`.
fn parse_frame_rate(value: Option<&str>) -> Option<f64> {
    let (num, den) = value?.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    (den > 0.0 && num > 0.0).then(|| num / den)
}

fn stream_rotation(stream: &ProbeStream) -> Option<u32> {
    let degrees = stream
        .tags
        .get("rotate")
        .and_then(|r| r.trim().parse::<i64>().ok())
        .or_else(|| {
            stream
                .side_data_list
                .iter()
                .find_map(|sd| sd.get("rotation").and_then(serde_json::Value::as_i64))
        })?;
    u32::try_from(degrees.rem_euclid(360)).ok()
}
