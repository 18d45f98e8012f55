//! `tasklist` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, open the task database, and hand off to `app`.
//! - Map failures to a non-zero exit status.

mod app;
mod config;

use app::{Cli, CliError};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = app::run(cli);
    tasklist_core::flush_logs();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let CliError::Open(_) = err {
                eprintln!("the task database could not be opened; nothing was changed");
            }
            ExitCode::FAILURE
        }
    }
}
