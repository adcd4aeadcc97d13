//! Semantic encoding options and their translation to encoder flags.
//!
//! [`EncodingOptions`] is an insertion-ordered map from semantic names
//! (`video_codec`, `resolution`, ...) to [`OptionValue`]s. Arguments are
//! emitted in insertion order, so positionally sensitive flags stay where the
//! caller put them. Writing a key that is already present replaces its value
//! in place.
//!
//! Keys without a known flag follow the map's [`UnknownKeyPolicy`]. No
//! semantic validation of flag combinations happens here; the encoder
//! rejects nonsense itself.

use crate::error::{CoreError, CoreResult};

use super::value::OptionValue;

/// What to do with keys that have no known encoder flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    /// Drop the key (logged at debug level)
    #[default]
    Ignore,
    /// Emit `-<key> <value>` verbatim
    Passthrough,
}

/// Keys whose integer values are kilobit rates and get a `k` suffix.
const BITRATE_KEYS: &[&str] = &[
    "video_bitrate",
    "audio_bitrate",
    "video_max_bitrate",
    "video_min_bitrate",
    "buffer_size",
    "video_bitrate_tolerance",
];

/// Maps a semantic option name to its encoder flag.
#[must_use]
pub fn flag_for(key: &str) -> Option<&'static str> {
    let flag = match key {
        "video_codec" => "-vcodec",
        "audio_codec" => "-acodec",
        "frame_rate" => "-r",
        "resolution" => "-s",
        "video_bitrate" => "-b:v",
        "audio_bitrate" => "-b:a",
        "video_max_bitrate" => "-maxrate",
        "video_min_bitrate" => "-minrate",
        "buffer_size" => "-bufsize",
        "video_bitrate_tolerance" => "-bt",
        "audio_sample_rate" => "-ar",
        "audio_channels" => "-ac",
        "aspect" => "-aspect",
        "keyframe_interval" => "-g",
        "threads" => "-threads",
        "duration" => "-t",
        "seek_time" => "-ss",
        "target" => "-target",
        "x264_vprofile" => "-vprofile",
        "x264_preset" => "-preset",
        "video_preset" => "-vpre",
        "audio_preset" => "-apre",
        "file_preset" => "-fpre",
        "quality" => "-q:v",
        "vframes" => "-vframes",
        "pixel_format" => "-pix_fmt",
        "video_filter" => "-vf",
        "audio_filter" => "-af",
        "filter_complex" => "-filter_complex",
        _ => return None,
    };
    Some(flag)
}

/// Insertion-ordered semantic option map.
///
/// # Examples
///
/// ```rust
/// use reelsmith_core::options::EncodingOptions;
///
/// let options = EncodingOptions::new()
///     .with("video_codec", "libx264")
///     .with("resolution", "1280x720")
///     .with("video_bitrate", 1500);
///
/// assert_eq!(
///     options.to_args().unwrap(),
///     vec!["-vcodec", "libx264", "-s", "1280x720", "-b:v", "1500k"]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodingOptions {
    entries: Vec<(String, OptionValue)>,
    unknown_keys: UnknownKeyPolicy,
}

impl EncodingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An option map that passes unknown keys through as `-<key> <value>`.
    #[must_use]
    pub fn passthrough() -> Self {
        Self::default().with_unknown_keys(UnknownKeyPolicy::Passthrough)
    }

    #[must_use]
    pub fn with_unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    #[must_use]
    pub fn unknown_keys(&self) -> UnknownKeyPolicy {
        self.unknown_keys
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key`. An existing key keeps its position and takes the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width from the `resolution` option (`WxH`).
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.dimensions().map(|(w, _)| w)
    }

    /// Height from the `resolution` option (`WxH`).
    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.dimensions().map(|(_, h)| h)
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        let OptionValue::Text(resolution) = self.get("resolution")? else {
            return None;
        };
        let (w, h) = resolution.split_once('x')?;
        Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
    }

    /// Encodes the options as an argument list, in insertion order.
    pub fn to_args(&self) -> CoreResult<Vec<String>> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            match key.as_str() {
                "custom" => push_custom(&mut args, value)?,
                "screenshot" => self.push_screenshot(&mut args, value)?,
                _ => match flag_for(key) {
                    Some(flag) => push_known(&mut args, key, flag, value)?,
                    None => self.push_unknown(&mut args, key, value),
                },
            }
        }
        Ok(args)
    }

    fn push_screenshot(&self, args: &mut Vec<String>, value: &OptionValue) -> CoreResult<()> {
        match value {
            OptionValue::Flag(true) => {
                if !self.contains_key("vframes") {
                    args.extend(["-vframes".to_string(), "1".to_string()]);
                }
                args.extend(["-f".to_string(), "image2".to_string()]);
                Ok(())
            }
            OptionValue::Flag(false) => Ok(()),
            other => Err(CoreError::InvalidOptions(format!(
                "'screenshot' expects a flag, got {}",
                other.kind()
            ))),
        }
    }

    fn push_unknown(&self, args: &mut Vec<String>, key: &str, value: &OptionValue) {
        match self.unknown_keys {
            UnknownKeyPolicy::Ignore => {
                log::debug!("Ignoring unknown encoding option '{key}' ({value})");
            }
            UnknownKeyPolicy::Passthrough => {
                let flag = if key.starts_with('-') {
                    key.to_string()
                } else {
                    format!("-{key}")
                };
                match value {
                    OptionValue::Flag(false) => {}
                    OptionValue::Flag(true) => args.push(flag),
                    OptionValue::Args(values) => {
                        args.push(flag);
                        args.extend(values.iter().cloned());
                    }
                    other => {
                        args.push(flag);
                        args.push(other.as_arg().unwrap_or_default());
                    }
                }
            }
        }
    }
}

fn push_known(args: &mut Vec<String>, key: &str, flag: &str, value: &OptionValue) -> CoreResult<()> {
    let rendered = match value {
        OptionValue::Flag(false) => return Ok(()),
        OptionValue::Int(n) if BITRATE_KEYS.contains(&key) => format!("{n}k"),
        other => other.as_arg().ok_or_else(|| {
            CoreError::InvalidOptions(format!(
                "option '{key}' needs a value, got {}",
                other.kind()
            ))
        })?,
    };
    args.push(flag.to_string());
    args.push(rendered);
    Ok(())
}

fn push_custom(args: &mut Vec<String>, value: &OptionValue) -> CoreResult<()> {
    match value {
        OptionValue::Args(values) => args.extend(values.iter().cloned()),
        OptionValue::Text(text) => args.extend(text.split_whitespace().map(str::to_string)),
        other => {
            return Err(CoreError::InvalidOptions(format!(
                "'custom' expects an argument list or text, got {}",
                other.kind()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let options = EncodingOptions::new()
            .with("seek_time", "00:00:03")
            .with("frame_rate", 30)
            .with("video_codec", "libx264")
            .with("audio_codec", "aac");
        assert_eq!(
            options.to_args().unwrap(),
            vec!["-ss", "00:00:03", "-r", "30", "-vcodec", "libx264", "-acodec", "aac"]
        );
    }

    #[test]
    fn test_last_write_wins_in_place() {
        let mut options = EncodingOptions::new()
            .with("video_codec", "libx264")
            .with("resolution", "640x360");
        options.set("video_codec", "libx265");
        assert_eq!(options.len(), 2);
        assert_eq!(
            options.to_args().unwrap(),
            vec!["-vcodec", "libx265", "-s", "640x360"]
        );
    }

    #[test]
    fn test_unknown_keys_ignored_by_default() {
        let options = EncodingOptions::new()
            .with("movflags", "+faststart")
            .with("video_codec", "libx264");
        assert_eq!(options.to_args().unwrap(), vec!["-vcodec", "libx264"]);
    }

    #[test]
    fn test_unknown_keys_passthrough() {
        let options = EncodingOptions::passthrough()
            .with("movflags", "+faststart")
            .with("-an", true)
            .with("shortest", false)
            .with("crf", 23);
        assert_eq!(
            options.to_args().unwrap(),
            vec!["-movflags", "+faststart", "-an", "-crf", "23"]
        );
    }

    #[test]
    fn test_bitrates_get_kilobit_suffix() {
        let options = EncodingOptions::new()
            .with("video_bitrate", 800)
            .with("audio_bitrate", "128k")
            .with("buffer_size", 2000);
        assert_eq!(
            options.to_args().unwrap(),
            vec!["-b:v", "800k", "-b:a", "128k", "-bufsize", "2000k"]
        );
    }

    #[test]
    fn test_custom_args_spliced_verbatim() {
        let options = EncodingOptions::new()
            .with("video_codec", "libx264")
            .with("custom", OptionValue::args(["-map", "0:v:0", "-movflags", "+faststart"]))
            .with("audio_codec", "aac");
        assert_eq!(
            options.to_args().unwrap(),
            vec![
                "-vcodec", "libx264", "-map", "0:v:0", "-movflags", "+faststart", "-acodec",
                "aac"
            ]
        );

        let text = EncodingOptions::new().with("custom", "-an  -sn");
        assert_eq!(text.to_args().unwrap(), vec!["-an", "-sn"]);
    }

    #[test]
    fn test_filters_joined() {
        let options = EncodingOptions::new().with(
            "video_filter",
            OptionValue::filters(["scale=1280:-2", "drawtext=text='hi'"]),
        );
        assert_eq!(
            options.to_args().unwrap(),
            vec!["-vf", "scale=1280:-2,drawtext=text='hi'"]
        );
    }

    #[test]
    fn test_screenshot_expands() {
        let options = EncodingOptions::new()
            .with("screenshot", true)
            .with("resolution", "320x180");
        assert_eq!(
            options.to_args().unwrap(),
            vec!["-vframes", "1", "-f", "image2", "-s", "320x180"]
        );

        let explicit = EncodingOptions::new()
            .with("vframes", 5)
            .with("screenshot", true);
        assert_eq!(
            explicit.to_args().unwrap(),
            vec!["-vframes", "5", "-f", "image2"]
        );
    }

    #[test]
    fn test_malformed_values_rejected() {
        let flag_for_valued = EncodingOptions::new().with("video_codec", true);
        assert!(matches!(
            flag_for_valued.to_args(),
            Err(CoreError::InvalidOptions(_))
        ));

        let bad_custom = EncodingOptions::new().with("custom", 5);
        assert!(matches!(bad_custom.to_args(), Err(CoreError::InvalidOptions(_))));

        let bad_screenshot = EncodingOptions::new().with("screenshot", "yes");
        assert!(matches!(
            bad_screenshot.to_args(),
            Err(CoreError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_dimensions_from_resolution() {
        let options = EncodingOptions::new().with("resolution", "1920x1080");
        assert_eq!(options.width(), Some(1920));
        assert_eq!(options.height(), Some(1080));

        let broken = EncodingOptions::new().with("resolution", "hd720");
        assert_eq!(broken.width(), None);
        assert_eq!(EncodingOptions::new().height(), None);
    }
}
