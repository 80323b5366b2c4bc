//! CLI dispatch for the `composer recolor` command.

use std::path::Path;
use std::process::ExitCode;

use crate::config::ComposerConfig;
use crate::output::{save_png, variant_path};
use crate::shiny::{pair_palette_files, recolor};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the recolor command.
///
/// The palette mapping is read off the shiny/original reference pair and
/// applied to `input`.
pub fn run_recolor(
    config: &ComposerConfig,
    input: Option<&Path>,
    shiny: Option<&Path>,
    original: Option<&Path>,
    output: Option<&Path>,
    swap: bool,
) -> ExitCode {
    let paths = &config.paths;
    let original = original
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.original));
    let shiny = shiny
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.shiny));
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| original.clone());

    let mut pair = match pair_palette_files(&shiny, &original) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if swap {
        pair = pair.swap();
    }
    log::debug!(
        "Palette mapping: dark {:?} light {:?}",
        pair.dark,
        pair.light
    );

    let sprite = match image::open(&input) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let variant = if swap { "inverted" } else { "shiny" };
    let target = variant_path(&input, variant, output);
    if let Err(e) = save_png(&recolor(&sprite, &pair), &target) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    ExitCode::from(EXIT_SUCCESS)
}
