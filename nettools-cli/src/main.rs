use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use nettools_core::NettoolsError;
use tracing::Level;

mod cli;
mod commands;
mod render;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    match commands::run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<NettoolsError>())
                .map(|e| format!(" ({})", e.kind()))
                .unwrap_or_default();
            eprintln!("{}{} {:#}", "error".red().bold(), kind, err);
            ExitCode::FAILURE
        }
    }
}
