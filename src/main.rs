//! Composer - command-line tool for preparing sprite assets for the ROM build

use std::process::ExitCode;

use sprite_composer::cli;

fn main() -> ExitCode {
    cli::run()
}
