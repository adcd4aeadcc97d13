//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. Helpers
//! shared between commands live here.

/// `probe`: prints what ffprobe reports for a file or URL.
pub mod probe;
/// `text-clip`: renders a still image with text overlays into a clip.
pub mod text_clip;
/// `transcode`: converts a file or URL with typed and generic options.
pub mod transcode;

use crate::error::{CliResult, usage_error};
use reelsmith_core::config::CoreConfig;
use reelsmith_core::options::{EncodingOptions, OptionValue};
use reelsmith_core::remote::{HttpRedirectClient, is_remote, resolve_remote_input};

/// Parses a `KEY=VALUE` argument into an option entry.
///
/// Values are typed by shape: integers, then floats, then `true`/`false`,
/// otherwise text. `KEY` alone is a bare flag.
pub fn parse_key_value(arg: &str) -> CliResult<(String, OptionValue)> {
    let (key, value) = match arg.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value)),
        None => (arg.trim(), None),
    };
    if key.is_empty() {
        return Err(usage_error(format!("option '{arg}' has an empty key")));
    }
    let value = match value {
        None => OptionValue::Flag(true),
        Some(value) => parse_option_value(value),
    };
    Ok((key.to_string(), value))
}

/// Types a command-line option value.
#[must_use]
pub fn parse_option_value(value: &str) -> OptionValue {
    if let Ok(int) = value.parse::<i64>() {
        return OptionValue::Int(int);
    }
    // Keep things like "inf" or "nan" as text.
    if let Ok(float) = value.parse::<f64>() {
        if float.is_finite() {
            return OptionValue::Float(float);
        }
    }
    match value {
        "true" => OptionValue::Flag(true),
        "false" => OptionValue::Flag(false),
        _ => OptionValue::Text(value.to_string()),
    }
}

/// Applies `KEY=VALUE` arguments to `options` in order; later keys overwrite
/// earlier ones in place.
pub fn apply_key_values(options: &mut EncodingOptions, args: &[String]) -> CliResult<()> {
    for arg in args {
        let (key, value) = parse_key_value(arg)?;
        options.set(key, value);
    }
    Ok(())
}

/// Follows redirects for URL inputs; local paths are returned unchanged.
pub fn resolve_input(config: &CoreConfig, input: &str) -> CliResult<String> {
    if !is_remote(input) {
        return Ok(input.to_string());
    }
    let client = HttpRedirectClient::new()?;
    let resolved = resolve_remote_input(input, config.max_http_redirect_attempts, &client)?;
    if resolved != input {
        log::info!("Resolved {input} to {resolved}");
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option_value_shapes() {
        assert_eq!(parse_option_value("23"), OptionValue::Int(23));
        assert_eq!(parse_option_value("-4"), OptionValue::Int(-4));
        assert_eq!(parse_option_value("29.97"), OptionValue::Float(29.97));
        assert_eq!(parse_option_value("true"), OptionValue::Flag(true));
        assert_eq!(parse_option_value("false"), OptionValue::Flag(false));
        assert_eq!(parse_option_value("inf"), OptionValue::Text("inf".to_string()));
        assert_eq!(parse_option_value("00:00:03"), OptionValue::Text("00:00:03".to_string()));
        assert_eq!(parse_option_value(""), OptionValue::Text(String::new()));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("crf=23").unwrap(),
            ("crf".to_string(), OptionValue::Int(23))
        );
        assert_eq!(
            parse_key_value("movflags=+faststart").unwrap(),
            ("movflags".to_string(), OptionValue::Text("+faststart".to_string()))
        );
        assert_eq!(
            parse_key_value("an").unwrap(),
            ("an".to_string(), OptionValue::Flag(true))
        );
        assert!(parse_key_value("=5").is_err());
    }

    #[test]
    fn test_apply_key_values_overwrites_in_place() {
        let mut options = EncodingOptions::new().with("video_codec", "libx264");
        apply_key_values(
            &mut options,
            &["audio_codec=aac".to_string(), "video_codec=libx265".to_string()],
        )
        .unwrap();
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["video_codec", "audio_codec"]);
        assert_eq!(options.get("video_codec"), Some(&OptionValue::Text("libx265".to_string())));
    }

    #[test]
    fn test_resolve_input_leaves_paths_alone() {
        let config = CoreConfig::new();
        assert_eq!(resolve_input(&config, "clip.mov").unwrap(), "clip.mov");
    }
}
