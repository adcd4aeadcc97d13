// reelsmith-cli/src/commands/transcode.rs
//
// Implements the `transcode` command: maps flags onto option sets, resolves
// and probes the input, then runs the supervised encode behind a progress
// bar.

use crate::cli::TranscodeArgs;
use crate::commands::{apply_key_values, resolve_input};
use crate::error::{CliResult, usage_error};
use crate::progress::CliProgress;
use console::style;
use reelsmith_core::config::CoreConfig;
use reelsmith_core::external::{CommandFfprobeExecutor, FfprobeExecutor, SidecarSpawner};
use reelsmith_core::options::set::{RAW_SCREENSHOT_MARKER, RAW_SEEK_MARKER};
use reelsmith_core::options::{EncodingOptions, OptionSet, OptionValue};
use reelsmith_core::remote::is_remote;
use reelsmith_core::transcode::{TranscodeInput, Transcoder, TranscoderOptions};
use reelsmith_core::CoreError;
use std::path::Path;

/// Builds the output-side option set from typed flags, `--option` pairs and
/// `--raw-arg` lists.
///
/// Raw arguments replace the mapped form entirely, so combining them with
/// typed flags or `--option` is rejected.
pub fn build_output_options(args: &TranscodeArgs) -> CliResult<OptionSet> {
    let mut options = if args.passthrough_unknown {
        EncodingOptions::passthrough()
    } else {
        EncodingOptions::new()
    };

    let typed: [(&str, Option<OptionValue>); 10] = [
        ("video_codec", args.video_codec.clone().map(OptionValue::Text)),
        ("audio_codec", args.audio_codec.clone().map(OptionValue::Text)),
        ("resolution", args.resolution.clone().map(OptionValue::Text)),
        ("video_bitrate", args.video_bitrate.map(OptionValue::from)),
        ("audio_bitrate", args.audio_bitrate.map(OptionValue::from)),
        ("frame_rate", args.frame_rate.map(OptionValue::Float)),
        ("audio_sample_rate", args.audio_sample_rate.map(OptionValue::from)),
        ("audio_channels", args.audio_channels.map(OptionValue::from)),
        ("duration", args.duration.map(OptionValue::Float)),
        ("pixel_format", args.pixel_format.clone().map(OptionValue::Text)),
    ];
    for (key, value) in typed {
        if let Some(value) = value {
            options.set(key, value);
        }
    }
    if !args.video_filters.is_empty() {
        options.set("video_filter", OptionValue::filters(args.video_filters.iter()));
    }
    if !args.audio_filters.is_empty() {
        options.set("audio_filter", OptionValue::filters(args.audio_filters.iter()));
    }
    apply_key_values(&mut options, &args.options)?;

    if !args.raw_args.is_empty() {
        if !options.is_empty() {
            return Err(usage_error(
                "--raw-arg cannot be combined with typed option flags or --option",
            ));
        }
        let mut raw = args.raw_args.clone();
        if args.screenshot {
            raw.push(RAW_SCREENSHOT_MARKER.to_string());
        }
        if let Some(seek) = &args.seek_time {
            // Only a screenshot moves the seek to the input side.
            let flag = if args.screenshot { RAW_SEEK_MARKER } else { "-ss" };
            raw.extend([flag.to_string(), seek.clone()]);
        }
        return Ok(OptionSet::raw(raw));
    }

    if args.screenshot {
        options.set("screenshot", true);
    }
    if let Some(seek) = &args.seek_time {
        options.set("seek_time", seek.as_str());
    }
    Ok(OptionSet::mapped(options))
}

/// Builds the job-level options: validation, aspect handling and input
/// options.
pub fn build_transcoder_options(args: &TranscodeArgs) -> CliResult<TranscoderOptions> {
    let mut topts = TranscoderOptions::new().validate(!args.no_validate);
    if let Some(by) = args.preserve_aspect {
        if args.resolution.is_none() {
            return Err(usage_error("--preserve-aspect requires --resolution"));
        }
        topts = topts.preserve_aspect_ratio(by);
    }
    if !args.input_options.is_empty() {
        let mut input = EncodingOptions::passthrough();
        apply_key_values(&mut input, &args.input_options)?;
        topts = topts.input_options(OptionSet::mapped(input));
    }
    Ok(topts)
}

/// Picks the transcoder input for a resolved location.
///
/// A valid probe gives the job a duration for progress and a source aspect
/// ratio. Anything else still encodes, without intermediate progress.
fn prepare_input<P>(prober: &P, location: &str) -> CliResult<TranscodeInput>
where
    P: FfprobeExecutor + ?Sized,
{
    if !is_remote(location) && !Path::new(location).exists() {
        return Err(CoreError::PathError(format!(
            "Input file '{location}' does not exist"
        )));
    }

    let media = prober.probe(location)?;
    if media.is_valid() {
        log::debug!(
            "Source: {} {}s",
            media.resolution().unwrap_or_else(|| "audio".to_string()),
            media.duration.unwrap_or_default()
        );
        Ok(TranscodeInput::Media(media))
    } else {
        log::warn!("ffprobe could not read {location}; progress will not be reported");
        Ok(TranscodeInput::from(location))
    }
}

/// Runs the `transcode` command.
pub fn run_transcode(config: &CoreConfig, args: TranscodeArgs) -> CliResult<()> {
    let options = build_output_options(&args)?;
    let topts = build_transcoder_options(&args)?;

    let location = resolve_input(config, &args.input)?;
    let prober = CommandFfprobeExecutor::from_config(config)?;
    let input = prepare_input(&prober, &location)?;

    let job = Transcoder::new(input, &args.output, options, topts)?;

    let progress = CliProgress::new(format!("Encoding {}", args.output.display()));
    let result = job.run(config, &SidecarSpawner, &prober, progress.callback());

    match result {
        Ok(Some(encoded)) => {
            progress.finish("Done");
            println!(
                "{} {}",
                style("Encoded").green().bold(),
                args.output.display()
            );
            if let Some(resolution) = encoded.resolution() {
                println!("  Resolution: {resolution}");
            }
            if let Some(duration) = encoded.duration {
                println!(
                    "  Duration:   {}",
                    CliProgress::format_duration_seconds(duration)
                );
            }
            Ok(())
        }
        Ok(None) => {
            progress.finish("Done (not validated)");
            println!(
                "{} {} (validation skipped)",
                style("Finished").yellow().bold(),
                args.output.display()
            );
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}
