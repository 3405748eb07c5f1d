// scenesift-cli/src/main.rs
//
// Entry point of the `scenesift` binary: parses arguments, installs the
// interrupt handler and maps command results to exit codes.
//
// Exit codes: 0 on success (including "no match" and "whole video" outcomes),
// 1 on a fatal error or when any video failed, 130 when interrupted.

use clap::Parser;
use owo_colors::OwoColorize;
use scenesift_cli::{Cli, Commands, CliResult, logging, run_segments, run_tags, run_trim};
use std::process;

const EXIT_INTERRUPTED: i32 = 130;

fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        let removed = scenesift_core::cleanup_registered_workspaces();
        eprintln!();
        eprintln!("Interrupted; removed {removed} working director{}", if removed == 1 { "y" } else { "ies" });
        process::exit(EXIT_INTERRUPTED);
    });
    if let Err(e) = installed {
        eprintln!("Warning: failed to install interrupt handler: {e}");
    }
}

fn run(cli: Cli) -> CliResult<i32> {
    let verbose = matches!(&cli.command, Commands::Trim(args) if args.verbose);
    logging::init_logging(verbose)?;

    match cli.command {
        Commands::Trim(args) => {
            let summary = run_trim(args)?;
            Ok(i32::from(summary.failed > 0))
        }
        Commands::Tags => {
            run_tags();
            Ok(0)
        }
        Commands::Segments(args) => {
            run_segments(&args)?;
            Ok(0)
        }
    }
}

fn main() {
    install_interrupt_handler();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            if std::env::var_os("NO_COLOR").is_none() {
                eprintln!("{} {e}", "Error:".red().bold());
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}
