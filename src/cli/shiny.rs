//! CLI dispatch for the `composer shiny` command.

use std::path::Path;
use std::process::ExitCode;

use crate::config::ComposerConfig;
use crate::output::write_text;
use crate::shiny::infer_palette_file;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the shiny command: infer the palette and write the listing.
///
/// The listing is also echoed to stdout.
pub fn run_shiny(
    config: &ComposerConfig,
    input: Option<&Path>,
    output: Option<&Path>,
) -> ExitCode {
    let paths = &config.paths;
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.shiny));
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.palette));

    let palette = match infer_palette_file(&input) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let listing = palette.to_pal();
    println!("{}", listing);

    if let Err(e) = write_text(&listing, &output) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    ExitCode::from(EXIT_SUCCESS)
}
