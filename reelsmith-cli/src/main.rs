// reelsmith-cli/src/main.rs
//
// Entry point for the `reelsmith` binary: parses arguments, sets up logging,
// builds the layered configuration and dispatches to the chosen command.
// Any error is printed and mapped to a non-zero exit code.

use clap::Parser;
use console::style;
use reelsmith_cli::{
    Cli, CliResult, Commands, build_core_config, error, logging, run_probe, run_text_clip,
    run_transcode,
};
use std::process;

fn run(cli: Cli) -> CliResult<()> {
    let config = build_core_config(&cli.global)?;
    match cli.command {
        Commands::Transcode(args) => run_transcode(&config, args),
        Commands::Probe(args) => run_probe(&config, args),
        Commands::TextClip(args) => run_text_clip(&config, args),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.global.verbose);

    if let Err(e) = run(cli) {
        log::debug!("Command failed: {e:?}");
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(error::exit_code(&e));
    }
}
