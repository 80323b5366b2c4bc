//! CLI dispatch for the `composer bundle` command.

use std::path::Path;
use std::process::ExitCode;

use crate::bundle::{write_bundles, BundleOptions, Conversion};
use crate::config::ComposerConfig;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Sources and settings of one bundle run, as given on the command line.
pub struct BundleArgs<'a> {
    pub name: &'a str,
    pub front: Option<&'a Path>,
    pub back: Option<&'a Path>,
    pub shiny: Option<&'a Path>,
    pub credits: Option<&'a str>,
    pub output: Option<&'a Path>,
    pub preview: Option<&'a Path>,
    pub swap: bool,
}

/// Execute the bundle command.
///
/// The source sprites are read from the staging directory unless given
/// explicitly; the archives land in `--output`, the configured bundle
/// directory, or the staging directory, in that order.
pub fn run_bundle(config: &ComposerConfig, args: &BundleArgs) -> ExitCode {
    if args.name.is_empty() {
        eprintln!("Error: bundle name must not be empty");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let paths = &config.paths;
    let front = args
        .front
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.gif));
    let back = args
        .back
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.original));
    let shiny = args
        .shiny
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.staged(&paths.shiny));
    let output = args
        .output
        .or(config.bundle.output.as_deref())
        .unwrap_or(paths.staging.as_path());

    let conversion = match Conversion::load(&front, &back, &shiny, &config.fixup.key_colors()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    log::info!(
        "Converted {} frames from {}",
        conversion.front.len(),
        front.display()
    );

    if let Some(dir) = args.preview {
        if let Err(e) = conversion.write_preview(dir) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let options = BundleOptions {
        name: args.name,
        credits: args.credits.unwrap_or(&config.bundle.credits),
        swap: args.swap,
    };
    match write_bundles(&conversion, &options, output) {
        Ok(paths) => {
            println!("{}", paths.archive.display());
            println!("{}", paths.v08.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
