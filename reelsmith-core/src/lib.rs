//! Command building and process supervision over ffmpeg and ffprobe.
//!
//! This crate assembles encoder and probe command lines from declarative
//! options, runs the encoder under a per-read deadline while reporting
//! fractional progress, and validates the file it produced. No media
//! processing happens in-process.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reelsmith_core::{CoreConfig, Transcoder, TranscoderOptions};
//! use reelsmith_core::external::{CommandFfprobeExecutor, FfprobeExecutor, SidecarSpawner};
//! use reelsmith_core::options::{EncodingOptions, OptionSet};
//! use reelsmith_core::transcode::PreserveAspect;
//!
//! let config = CoreConfig::from_env();
//! let prober = CommandFfprobeExecutor::from_config(&config).unwrap();
//! let source = prober.probe("input.mov").unwrap();
//!
//! let options = EncodingOptions::new()
//!     .with("video_codec", "libx264")
//!     .with("resolution", "1280x720")
//!     .with("audio_codec", "aac");
//!
//! let job = Transcoder::new(
//!     source,
//!     "output.mp4",
//!     OptionSet::mapped(options),
//!     TranscoderOptions::new().preserve_aspect_ratio(PreserveAspect::Width),
//! )
//! .unwrap();
//!
//! let encoded = job
//!     .run(&config, &SidecarSpawner, &prober, |p| println!("{:.0}%", p * 100.0))
//!     .unwrap();
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod options;
pub mod overlay;
pub mod remote;
pub mod transcode;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use media::MediaDescriptor;
pub use options::{EncodingOptions, OptionSet, OptionValue, UnknownKeyPolicy};
pub use overlay::{LogoOutro, StillImageClip, TextOverlay, TextPosition, Transition};
pub use remote::{HttpRedirectClient, RedirectClient, resolve_remote_input};
pub use transcode::{TranscodeInput, Transcoder, TranscoderOptions};
