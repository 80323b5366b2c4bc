//! CLI dispatch for the `composer fixup` command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::ComposerConfig;
use crate::fixup::fixup_file;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the fixup command.
///
/// With no files the configured sprites in the staging directory are fixed
/// in place. Processing stops at the first sprite that fails.
pub fn run_fixup(config: &ComposerConfig, files: &[PathBuf], output: Option<&Path>) -> ExitCode {
    let paths = &config.paths;
    let inputs: Vec<PathBuf> = if files.is_empty() {
        paths.sprites.iter().map(|f| paths.staged(f)).collect()
    } else {
        files.to_vec()
    };

    if output.is_some() && inputs.len() != 1 {
        eprintln!(
            "Error: --output needs exactly one input sprite, got {}",
            inputs.len()
        );
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let keys = config.fixup.key_colors();
    for input in &inputs {
        let target = output.unwrap_or(input.as_path());
        match fixup_file(input, target, &keys) {
            Ok(stats) => {
                log::info!(
                    "Fixed {}: {} pixels snapped, {} cleared",
                    input.display(),
                    stats.snapped_dark + stats.snapped_light,
                    stats.cleared
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
