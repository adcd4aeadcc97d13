//! Parsing of probe tool output.
//!
//! Two output styles are understood: the JSON document produced with
//! `-print_format json`, and the sectioned `key=value` text that older tool
//! versions print by default. Both end up in the same tolerant
//! [`ProbeOutput`] structure, where every field is optional.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Raw probe result: streams, container format, and an optional error object.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: Option<ProbeFormat>,
    #[serde(default)]
    pub error: Option<ProbeErrorInfo>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProbeStream {
    pub index: Option<i64>,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub r_frame_rate: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub display_aspect_ratio: Option<String>,
    pub duration: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<i64>,
    pub bit_rate: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub side_data_list: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProbeFormat {
    pub filename: Option<String>,
    pub format_name: Option<String>,
    pub duration: Option<String>,
    pub size: Option<String>,
    pub bit_rate: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProbeErrorInfo {
    pub code: Option<i64>,
    pub string: Option<String>,
}

impl ProbeOutput {
    pub fn video_stream(&self) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
    }

    pub fn audio_stream(&self) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"))
    }
}

/// Parses `-print_format json` output.
pub fn parse_json(stdout: &str) -> CoreResult<ProbeOutput> {
    serde_json::from_str(stdout)
        .map_err(|e| CoreError::FfprobeParse(format!("ffprobe JSON output deserialization: {e}")))
}

/// Parses the default sectioned `key=value` output:
///
/// ```text
/// [STREAM]
/// codec_type=video
/// width=640
/// TAG:rotate=90
/// [/STREAM]
/// [FORMAT]
/// duration=5.000000
/// [/FORMAT]
/// ```
pub fn parse_key_value(stdout: &str) -> CoreResult<ProbeOutput> {
    let mut output = ProbeOutput::default();
    let mut section: Option<(&str, HashMap<String, String>)> = None;

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(name) = line.strip_prefix("[/").and_then(|l| l.strip_suffix(']')) {
            match section.take() {
                Some((open, fields)) if open == name => match name {
                    "STREAM" => output.streams.push(stream_from_fields(fields)),
                    "FORMAT" => output.format = Some(format_from_fields(&fields)),
                    _ => {}
                },
                _ => {
                    return Err(CoreError::FfprobeParse(format!(
                        "unexpected closing section [/{name}]"
                    )));
                }
            }
        } else if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if section.is_some() {
                return Err(CoreError::FfprobeParse(format!(
                    "section [{name}] opened inside another section"
                )));
            }
            section = Some((name, HashMap::new()));
        } else if let Some((_, fields)) = section.as_mut() {
            if let Some((key, value)) = line.split_once('=') {
                fields.insert(key.to_string(), value.to_string());
            }
        }
    }

    if let Some((open, _)) = section {
        return Err(CoreError::FfprobeParse(format!("unterminated section [{open}]")));
    }
    if output.streams.is_empty() && output.format.is_none() {
        return Err(CoreError::FfprobeParse(
            "no [STREAM] or [FORMAT] sections in ffprobe output".to_string(),
        ));
    }
    Ok(output)
}

fn available(value: Option<&String>) -> Option<String> {
    value.filter(|v| v.as_str() != "N/A" && !v.is_empty()).cloned()
}

fn stream_from_fields(fields: HashMap<String, String>) -> ProbeStream {
    let int = |key: &str| available(fields.get(key)).and_then(|v| v.parse::<i64>().ok());
    let text = |key: &str| available(fields.get(key));

    let tags = fields
        .iter()
        .filter_map(|(k, v)| k.strip_prefix("TAG:").map(|t| (t.to_string(), v.clone())))
        .collect();

    let side_data_list = int("rotation")
        .map(|rotation| vec![serde_json::json!({ "rotation": rotation })])
        .unwrap_or_default();

    ProbeStream {
        index: int("index"),
        codec_type: text("codec_type"),
        codec_name: text("codec_name"),
        width: int("width"),
        height: int("height"),
        r_frame_rate: text("r_frame_rate"),
        avg_frame_rate: text("avg_frame_rate"),
        display_aspect_ratio: text("display_aspect_ratio"),
        duration: text("duration"),
        sample_rate: text("sample_rate"),
        channels: int("channels"),
        bit_rate: text("bit_rate"),
        tags,
        side_data_list,
    }
}

fn format_from_fields(fields: &HashMap<String, String>) -> ProbeFormat {
    ProbeFormat {
        filename: available(fields.get("filename")),
        format_name: available(fields.get("format_name")),
        duration: available(fields.get("duration")),
        size: available(fields.get("size")),
        bit_rate: available(fields.get("bit_rate")),
    }
}
