//! aikit CLI entry point
//!
//! Parses the command line, runs the command and reports failures with details and
//! suggestions before exiting with status 1.

use aikit_cli::cli;
use aikit_cli::core::user_friendly_error;
use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
