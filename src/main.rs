//! capprobe entry point.
//!
//! Parses the command line and hands off to the CLI module. Exit codes:
//! 0 success, 1 failure, 2 configuration error.

use std::process::ExitCode;

use capprobe::cli::{self, Cli};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = cli::dispatch(cli);
    ExitCode::from(code as u8)
}
