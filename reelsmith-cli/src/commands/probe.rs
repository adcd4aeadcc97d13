// reelsmith-cli/src/commands/probe.rs
//
// Implements the `probe` command.

use crate::cli::ProbeArgs;
use crate::commands::resolve_input;
use crate::error::CliResult;
use console::style;
use reelsmith_core::config::CoreConfig;
use reelsmith_core::external::{CommandFfprobeExecutor, FfprobeExecutor};
use reelsmith_core::{CoreError, MediaDescriptor};

/// Human-readable fields of a descriptor, skipping the ones ffprobe did not
/// report.
#[must_use]
pub fn describe(media: &MediaDescriptor) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Path", media.path.clone())];
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value {
            rows.push((label, value));
        }
    };

    push("Format", media.format_name.clone());
    push("Duration", media.duration.map(|d| format!("{d:.3}s")));
    push("Bitrate", media.bitrate.map(|b| format!("{} kb/s", b / 1000)));
    push("Size", media.size.map(|s| format!("{s} bytes")));
    push("Video codec", media.video_codec.clone());
    push("Resolution", media.resolution());
    push("Frame rate", media.frame_rate.map(|r| format!("{r:.3}")));
    push("Aspect ratio", media.display_aspect_ratio.clone());
    push("Rotation", media.rotation.map(|r| format!("{r}°")));
    push("Audio codec", media.audio_codec.clone());
    push("Sample rate", media.audio_sample_rate.map(|r| format!("{r} Hz")));
    push("Channels", media.audio_channels.map(|c| c.to_string()));
    rows
}

/// Runs the `probe` command. An unreadable input prints what is known and
/// fails.
pub fn run_probe(config: &CoreConfig, args: ProbeArgs) -> CliResult<()> {
    let location = resolve_input(config, &args.input)?;
    let prober = CommandFfprobeExecutor::from_config(config)?;
    let media = prober.probe(&location)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&media)?);
    } else {
        for (label, value) in describe(&media) {
            println!("{:<13} {}", style(format!("{label}:")).bold(), value);
        }
    }

    if media.is_valid() {
        Ok(())
    } else {
        Err(CoreError::PathError(format!(
            "'{location}' is not a readable media file"
        )))
    }
}
