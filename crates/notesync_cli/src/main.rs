//! Terminal front end for the notes service.
//!
//! # Responsibility
//! - Parse arguments, load config and start logging.
//! - Drive `notesync_core` use-cases and render their state as text.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
