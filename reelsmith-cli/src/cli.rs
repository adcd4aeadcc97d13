// reelsmith-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use reelsmith_core::transcode::PreserveAspect;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reelsmith: ffmpeg command building and supervision",
    long_about = "Builds ffmpeg command lines from declarative options, runs them under a read \
                  deadline with live progress, and validates the produced file with ffprobe."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the ffmpeg binary (searched on PATH when omitted)
    #[arg(long, global = true, value_name = "PATH", env = "REELSMITH_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary (searched on PATH when omitted)
    #[arg(long, global = true, value_name = "PATH", env = "REELSMITH_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Seconds to wait for each line of encoder output; 0 waits forever
    #[arg(long, global = true, value_name = "SECS", allow_negative_numbers = true)]
    pub timeout: Option<f64>,

    /// Maximum HTTP redirects followed for URL inputs
    #[arg(long, global = true, value_name = "N")]
    pub max_redirects: Option<u32>,

    /// JSON configuration file, applied before environment variables
    #[arg(long, global = true, value_name = "FILE.json")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcodes a file or URL with ffmpeg and validates the result
    Transcode(TranscodeArgs),
    /// Probes a file or URL with ffprobe and prints what it found
    Probe(ProbeArgs),
    /// Renders a still image into a video clip with text overlays
    TextClip(TextClipArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct TranscodeArgs {
    /// Input file or http(s) URL
    #[arg(required = true, value_name = "INPUT")]
    pub input: String,

    /// Output file; its extension picks the container
    #[arg(required = true, value_name = "OUTPUT")]
    pub output: PathBuf,

    // --- Typed Output Options ---
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    #[arg(long, value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Frame size as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH")]
    pub resolution: Option<String>,

    /// Video bitrate in kbit/s
    #[arg(long, value_name = "KBPS")]
    pub video_bitrate: Option<u32>,

    /// Audio bitrate in kbit/s
    #[arg(long, value_name = "KBPS")]
    pub audio_bitrate: Option<u32>,

    #[arg(long, value_name = "FPS")]
    pub frame_rate: Option<f64>,

    #[arg(long, value_name = "HZ")]
    pub audio_sample_rate: Option<u32>,

    #[arg(long, value_name = "N")]
    pub audio_channels: Option<u32>,

    /// Stop writing after this many seconds
    #[arg(long, value_name = "SECS")]
    pub duration: Option<f64>,

    #[arg(long, value_name = "FMT")]
    pub pixel_format: Option<String>,

    /// Video filter; repeat to build a chain
    #[arg(long = "video-filter", value_name = "FILTER")]
    pub video_filters: Vec<String>,

    /// Audio filter; repeat to build a chain
    #[arg(long = "audio-filter", value_name = "FILTER")]
    pub audio_filters: Vec<String>,

    // --- Generic Options ---
    /// Extra output option as KEY=VALUE; repeatable
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Extra input option as KEY=VALUE; repeatable
    #[arg(long = "input-option", value_name = "KEY=VALUE")]
    pub input_options: Vec<String>,

    /// Verbatim output argument; repeatable. Cannot be mixed with mapped options
    #[arg(long = "raw-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub raw_args: Vec<String>,

    /// Emit unrecognised option keys as `-KEY VALUE` instead of dropping them
    #[arg(long, default_value_t = false)]
    pub passthrough_unknown: bool,

    /// Keep this dimension of the requested resolution and derive the other
    /// from the source aspect ratio
    #[arg(long, value_name = "width|height")]
    pub preserve_aspect: Option<PreserveAspect>,

    /// Write a single frame as an image
    #[arg(long, default_value_t = false)]
    pub screenshot: bool,

    /// Position to seek to, e.g. 12.5 or 00:00:12.500
    #[arg(long, value_name = "TIME")]
    pub seek_time: Option<String>,

    /// Skip probing the output after the encoder exits
    #[arg(long, default_value_t = false)]
    pub no_validate: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Input file or http(s) URL
    #[arg(required = true, value_name = "INPUT")]
    pub input: String,

    /// Print the descriptor as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TextClipArgs {
    /// Still image to loop
    #[arg(required = true, value_name = "IMAGE")]
    pub image: PathBuf,

    /// Output video file
    #[arg(required = true, value_name = "OUTPUT")]
    pub output: PathBuf,

    /// JSON file holding one text overlay object or an array of them
    #[arg(long, value_name = "FILE.json")]
    pub texts: Option<PathBuf>,

    /// Clip length in seconds
    #[arg(long, value_name = "SECS", default_value_t = reelsmith_core::overlay::DEFAULT_CLIP_SECS)]
    pub duration: f64,

    /// Logo image appended to the clip with a transition
    #[arg(long, value_name = "PNG")]
    pub logo: Option<PathBuf>,

    /// xfade transition name, or `random`
    #[arg(long, value_name = "NAME", default_value = "fade")]
    pub transition: String,

    /// Extra output option as KEY=VALUE; repeatable
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Skip probing the output after the encoder exits
    #[arg(long, default_value_t = false)]
    pub no_validate: bool,
}
