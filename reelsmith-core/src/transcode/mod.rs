//! Transcode jobs: supervision, validation and aspect handling.

pub mod aspect;
pub mod supervisor;
pub mod transcoder;
pub mod validator;

pub use aspect::{PreserveAspect, even_dimension};
pub use supervisor::{SupervisedRun, parse_progress_time, spawn_and_supervise, supervise};
pub use transcoder::{TranscodeInput, Transcoder, TranscoderOptions};
pub use validator::validate_output;
