// reelsmith-cli/src/lib.rs
//
// Library portion of the Reelsmith CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, GlobalArgs, ProbeArgs, TextClipArgs, TranscodeArgs};
pub use commands::probe::run_probe;
pub use commands::text_clip::run_text_clip;
pub use commands::transcode::run_transcode;
pub use config::build_core_config;
pub use error::CliResult;
