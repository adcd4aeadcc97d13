//! Resolution adjustment that keeps the source aspect ratio.

use std::str::FromStr;

use crate::error::CoreError;
use crate::options::EncodingOptions;

/// Which requested dimension is kept when preserving the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreserveAspect {
    /// Keep the width, derive the height
    Width,
    /// Keep the height, derive the width
    Height,
}

impl FromStr for PreserveAspect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            other => Err(CoreError::InvalidOptions(format!(
                "preserve_aspect_ratio must be 'width' or 'height', got '{other}'"
            ))),
        }
    }
}

/// Nearest even integer to `x`. Odd integers sit exactly between two even
/// numbers and round up.
#[must_use]
pub fn even_dimension(x: f64) -> u32 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    ((x / 2.0).round() * 2.0) as u32
}

/// Rewrites `resolution` in `options` so the derived dimension follows `ratio`.
///
/// Returns `false`, leaving `options` untouched, when the kept dimension is
/// missing or `ratio` is unusable.
pub fn apply(options: &mut EncodingOptions, ratio: f64, by: PreserveAspect) -> bool {
    if !ratio.is_finite() || ratio <= 0.0 {
        log::debug!("Skipping aspect adjustment: unusable ratio {ratio}");
        return false;
    }

    let (width, height) = match by {
        PreserveAspect::Width => {
            let Some(width) = options.width() else {
                log::debug!("Skipping aspect adjustment: no width requested");
                return false;
            };
            (width, even_dimension(f64::from(width) / ratio))
        }
        PreserveAspect::Height => {
            let Some(height) = options.height() else {
                log::debug!("Skipping aspect adjustment: no height requested");
                return false;
            };
            (even_dimension(f64::from(height) * ratio), height)
        }
    };

    log::debug!("Aspect-adjusted resolution: {width}x{height} (ratio {ratio:.4})");
    options.set("resolution", format!("{width}x{height}"));
    true
}
