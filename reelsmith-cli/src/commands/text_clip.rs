// reelsmith-cli/src/commands/text_clip.rs
//
// Implements the `text-clip` command: a still image looped into a clip with
// text overlays and an optional logo outro.

use crate::cli::TextClipArgs;
use crate::commands::apply_key_values;
use crate::error::CliResult;
use crate::progress::CliProgress;
use console::style;
use reelsmith_core::config::CoreConfig;
use reelsmith_core::external::{CommandFfprobeExecutor, SidecarSpawner};
use reelsmith_core::options::{EncodingOptions, OptionSet};
use reelsmith_core::overlay::{LogoOutro, StillImageClip, TextOverlay, Transition};
use reelsmith_core::CoreError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Parses overlay definitions: one object or an array of them.
pub fn parse_text_overlays(json: &str) -> CliResult<Vec<TextOverlay>> {
    let value: Value = serde_json::from_str(json)?;
    let overlays = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(overlays)
}

/// Reads overlay definitions from a JSON file.
pub fn load_text_overlays(path: &Path) -> CliResult<Vec<TextOverlay>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CoreError::PathError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_text_overlays(&contents)
}

/// Builds the clip job from parsed arguments.
pub fn build_clip(args: &TextClipArgs) -> CliResult<StillImageClip> {
    let texts = match &args.texts {
        Some(path) => load_text_overlays(path)?,
        None => Vec::new(),
    };

    let mut options = EncodingOptions::new();
    apply_key_values(&mut options, &args.options)?;

    let mut clip = StillImageClip::new(&args.image, &args.output)
        .duration(args.duration)
        .texts(texts)
        .options(OptionSet::mapped(options))
        .validate(!args.no_validate);
    if let Some(logo) = &args.logo {
        clip = clip.logo(LogoOutro::new(logo, Transition::parse(&args.transition)));
    }
    Ok(clip)
}

/// Runs the `text-clip` command.
pub fn run_text_clip(config: &CoreConfig, args: TextClipArgs) -> CliResult<()> {
    for path in std::iter::once(&args.image).chain(args.logo.as_ref()) {
        if !path.is_file() {
            return Err(CoreError::PathError(format!(
                "Image '{}' does not exist",
                path.display()
            )));
        }
    }

    let clip = build_clip(&args)?;
    let prober = CommandFfprobeExecutor::from_config(config)?;

    let progress = CliProgress::new(format!("Rendering {}", args.output.display()));
    let result = clip.run(config, &SidecarSpawner, &prober, progress.callback());

    match result {
        Ok(media) => {
            progress.finish("Done");
            let duration = media
                .and_then(|m| m.duration)
                .map(CliProgress::format_duration_seconds)
                .unwrap_or_else(|| "unvalidated".to_string());
            println!(
                "{} {} ({})",
                style("Rendered").green().bold(),
                clip.final_output().display(),
                duration
            );
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_core::overlay::TextPosition;

    #[test]
    fn test_parse_single_overlay_object() {
        let overlays = parse_text_overlays(r#"{ "text": "Hello", "position": "text_up_left" }"#).unwrap();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].text, "Hello");
        assert_eq!(overlays[0].position, TextPosition::TopLeft);
        assert_eq!(overlays[0].font_size, 40);
    }

    #[test]
    fn test_parse_overlay_array_keeps_order() {
        let overlays = parse_text_overlays(
            r#"[{ "text": "one", "font_size": 30 }, { "text": "two", "position": "bottom_center" }]"#,
        )
        .unwrap();
        let texts: Vec<&str> = overlays.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(overlays[0].font_size, 30);
        assert_eq!(overlays[1].position, TextPosition::BottomCenter);
    }

    #[test]
    fn test_parse_overlay_rejects_missing_text() {
        assert!(matches!(
            parse_text_overlays(r#"{ "font_size": 30 }"#),
            Err(CoreError::Json(_))
        ));
    }
}
