//! Option sets: either an already-encoded argument list or a semantic map.

use serde_json::Value;

use crate::error::{CoreError, CoreResult};

use super::encoding::EncodingOptions;
use super::value::OptionValue;

/// Marker accepted in raw argument lists to request a single-frame image.
pub const RAW_SCREENSHOT_MARKER: &str = "-screenshot";
/// Raw seek marker that moves to the input side when taking a screenshot.
pub const RAW_SEEK_MARKER: &str = "-seek_time";

/// Options attached to one side (input or output) of an encoder command.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSet {
    /// Arguments passed through verbatim
    Raw(Vec<String>),
    /// Semantic options translated by [`EncodingOptions::to_args`]
    Mapped(EncodingOptions),
}

impl Default for OptionSet {
    fn default() -> Self {
        Self::Mapped(EncodingOptions::default())
    }
}

impl From<EncodingOptions> for OptionSet {
    fn from(options: EncodingOptions) -> Self {
        Self::Mapped(options)
    }
}

impl OptionSet {
    /// A verbatim argument list.
    pub fn raw<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Raw(args.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn mapped(options: EncodingOptions) -> Self {
        Self::Mapped(options)
    }

    /// Builds an option set from JSON.
    ///
    /// An array of scalars becomes [`OptionSet::Raw`]; an object becomes
    /// [`OptionSet::Mapped`]. Everything else is rejected.
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        CoreError::InvalidOptions(format!(
                            "raw option lists may only hold scalars, got {item}"
                        ))
                    })
                })
                .collect::<CoreResult<Vec<_>>>()
                .map(Self::Raw),
            Value::Object(map) => {
                let mut options = EncodingOptions::new();
                for (key, value) in map {
                    options.set(key.as_str(), json_to_option_value(key, value)?);
                }
                Ok(Self::Mapped(options))
            }
            other => Err(CoreError::InvalidOptions(format!(
                "options must be an array or an object, got {other}"
            ))),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Raw(args) => args.is_empty(),
            Self::Mapped(options) => options.is_empty(),
        }
    }

    /// Encodes the set as encoder arguments.
    pub fn to_args(&self) -> CoreResult<Vec<String>> {
        match self {
            Self::Raw(args) => Ok(expand_raw_screenshot(args)),
            Self::Mapped(options) => options.to_args(),
        }
    }

    /// Whether the set asks for a single-frame screenshot.
    #[must_use]
    pub fn is_screenshot(&self) -> bool {
        match self {
            Self::Raw(args) => args.iter().any(|a| a == RAW_SCREENSHOT_MARKER),
            Self::Mapped(options) => {
                matches!(options.get("screenshot"), Some(OptionValue::Flag(true)))
            }
        }
    }

    /// Removes the output-side seek from a screenshot request.
    ///
    /// Returns `None` when the set is not a screenshot or carries no seek.
    pub fn take_screenshot_seek(&mut self) -> CoreResult<Option<String>> {
        if !self.is_screenshot() {
            return Ok(None);
        }
        match self {
            Self::Raw(args) => {
                let Some(idx) = args.iter().position(|a| a == RAW_SEEK_MARKER) else {
                    return Ok(None);
                };
                if idx + 1 >= args.len() {
                    return Err(CoreError::InvalidOptions(format!(
                        "'{RAW_SEEK_MARKER}' requires a value"
                    )));
                }
                let seek = args.remove(idx + 1);
                args.remove(idx);
                Ok(Some(seek))
            }
            Self::Mapped(options) => match options.remove("seek_time") {
                None => Ok(None),
                Some(value) => value.as_arg().map(Some).ok_or_else(|| {
                    CoreError::InvalidOptions(format!(
                        "'seek_time' needs a value, got {}",
                        value.kind()
                    ))
                }),
            },
        }
    }

    /// Sets the input seek, overwriting an existing one in place.
    pub fn set_seek(&mut self, seek: &str) {
        match self {
            Self::Raw(args) => match args.iter().position(|a| a == "-ss") {
                Some(idx) if idx + 1 < args.len() => args[idx + 1] = seek.to_string(),
                Some(_) => args.push(seek.to_string()),
                None => args.extend(["-ss".to_string(), seek.to_string()]),
            },
            Self::Mapped(options) => {
                if options.contains_key("ss") {
                    options.set("ss", seek);
                } else {
                    options.set("seek_time", seek);
                }
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_to_option_value(key: &str, value: &Value) -> CoreResult<OptionValue> {
    match value {
        Value::String(s) => Ok(OptionValue::Text(s.clone())),
        Value::Bool(b) => Ok(OptionValue::Flag(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(OptionValue::Int)
            .or_else(|| n.as_f64().map(OptionValue::Float))
            .ok_or_else(|| CoreError::InvalidOptions(format!("'{key}' is out of range: {n}"))),
        Value::Array(items) => {
            let strings = items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        CoreError::InvalidOptions(format!(
                            "'{key}' may only list scalars, got {item}"
                        ))
                    })
                })
                .collect::<CoreResult<Vec<_>>>()?;
            Ok(if key == "custom" {
                OptionValue::Args(strings)
            } else {
                OptionValue::Filters(strings)
            })
        }
        Value::Null | Value::Object(_) => Err(CoreError::InvalidOptions(format!(
            "'{key}' has an unsupported value: {value}"
        ))),
    }
}

fn expand_raw_screenshot(args: &[String]) -> Vec<String> {
    let has_vframes = args.iter().any(|a| a == "-vframes" || a == "-frames:v");
    let mut out = Vec::with_capacity(args.len() + 3);
    for arg in args {
        if arg == RAW_SCREENSHOT_MARKER {
            if !has_vframes {
                out.extend(["-vframes".to_string(), "1".to_string()]);
            }
            out.extend(["-f".to_string(), "image2".to_string()]);
        } else {
            out.push(arg.clone());
        }
    }
    out
}
