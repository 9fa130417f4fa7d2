//! # emacros CLI
//!
//! Command-line front end for `emacros-core`: save, rename, move, remove,
//! list and replay named keyboard macros. Run `emacros --help` for usage.

mod cli;
mod prompt;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
