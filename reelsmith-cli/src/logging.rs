// ============================================================================
// reelsmith-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialisation for the reelsmith binary
//
// Lines are written to stderr as `<timestamp> <LEVEL> <message>`, with the
// level coloured through `console` when stderr is a terminal. The default
// filter is `info`, or `debug` with `--verbose`; RUST_LOG overrides both.
// Raw encoder output is logged by the core under the `ffmpeg_log` target and
// only shows up at debug.

use console::style;
use log::{Level, LevelFilter};
use std::io::Write;

/// Returns the default filter for the given verbosity.
#[must_use]
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Safe to call once per process.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level(verbose));
    builder.parse_default_env();

    builder.format(|buf, record| {
        let level = format!("{:<5}", record.level());
        let level = match record.level() {
            Level::Error => style(level).red().bold(),
            Level::Warn => style(level).yellow().bold(),
            Level::Info => style(level).green(),
            Level::Debug => style(level).blue(),
            Level::Trace => style(level).dim(),
        };
        writeln!(
            buf,
            "{} {} {}",
            style(buf.timestamp_seconds()).dim(),
            level,
            record.args()
        )
    });

    // A second initialisation (e.g. from tests) is not an error worth reporting.
    let _ = builder.try_init();
}
