//! CLI dispatch for the `composer anim` command.

use std::path::Path;
use std::process::ExitCode;

use crate::anim::convert_animation;
use crate::config::ComposerConfig;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the anim command.
pub fn run_anim(
    config: &ComposerConfig,
    input: Option<&Path>,
    asm: Option<&Path>,
    sheet: Option<&Path>,
) -> ExitCode {
    let paths = &config.paths;
    let input = input
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.gif));
    let asm = asm
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.anim));
    let sheet = sheet
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.sheet));

    match convert_animation(&input, &asm, &sheet) {
        Ok(summary) => {
            log::info!(
                "Split {} into {} frames of {}x{}",
                input.display(),
                summary.frame_count,
                summary.frame_width,
                summary.frame_height
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
