//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod anim;
mod bundle;
mod fixup;
mod recolor;
mod shiny;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{self, CliOverrides, ComposerConfig};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Composer - prepare sprite assets for the ROM build
#[derive(Parser)]
#[command(name = "composer")]
#[command(about = "Composer - fix sprites, infer shiny palettes, split animations, export bundles")]
#[command(version)]
pub struct Cli {
    /// Log every step (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: nearest composer.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the staging directory
    #[arg(long, global = true)]
    pub staging: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Snap near-black/near-white to exact keys and clear the border background
    Fixup {
        /// Sprites to fix in place (default: the configured sprites)
        files: Vec<PathBuf>,

        /// Write the result here instead of in place (single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-channel snap tolerance (1-128, default: 8)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=128))]
        tolerance: Option<u8>,
    },

    /// Infer the 2-color shiny palette of a sprite and write a .pal listing
    Shiny {
        /// Shiny reference sprite (default: configured shiny sprite)
        input: Option<PathBuf>,

        /// Palette listing to write (default: configured palette)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply the shiny palette of a reference pair to a sprite
    Recolor {
        /// Sprite to recolor (default: the configured original sprite)
        input: Option<PathBuf>,

        /// Shiny reference sprite (default: configured shiny sprite)
        #[arg(long)]
        shiny: Option<PathBuf>,

        /// Normal-colored sprite matching the shiny reference (default: configured original)
        #[arg(long)]
        original: Option<PathBuf>,

        /// Output file (default: {input}_shiny.png, or {input}_inverted.png with --swap)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cross the two shiny colors over
        #[arg(long)]
        swap: bool,
    },

    /// Split an animated GIF into a vertical spritesheet and an anim.asm listing
    Anim {
        /// Animated sprite (default: configured gif)
        input: Option<PathBuf>,

        /// Frame timing listing to write (default: configured anim)
        #[arg(long)]
        asm: Option<PathBuf>,

        /// Spritesheet to write (default: configured sheet)
        #[arg(long)]
        sheet: Option<PathBuf>,
    },

    /// Convert the front, back and shiny sprites and pack them into import bundles
    Bundle {
        /// Name of the archives ({name}.zip and {name}-v08.zip)
        name: String,

        /// Animated front sprite (default: configured gif)
        #[arg(long)]
        front: Option<PathBuf>,

        /// Back sprite (default: configured original sprite)
        #[arg(long)]
        back: Option<PathBuf>,

        /// Shiny reference sprite (default: configured shiny sprite)
        #[arg(long)]
        shiny: Option<PathBuf>,

        /// Credits stored in the bundle (default: bundle.credits)
        #[arg(long)]
        credits: Option<String>,

        /// Directory for the archives (default: bundle.output, else the staging directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write every converted image into this directory
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Export the inverted shiny palette
        #[arg(long)]
        swap: bool,
    },
}

/// Set up `log` output on stderr.
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Load composer.toml and apply command-line overrides.
fn load_settings(cli: &Cli, tolerance: Option<u8>) -> Result<ComposerConfig, config::ConfigError> {
    let mut config = config::load_config(cli.config.as_deref())?;
    let overrides = CliOverrides {
        staging: cli.staging.clone(),
        tolerance,
    };
    config::merge_cli_overrides(&mut config, &overrides)?;
    Ok(config)
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let tolerance = match &cli.command {
        Commands::Fixup { tolerance, .. } => *tolerance,
        _ => None,
    };
    let config = match load_settings(&cli, tolerance) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Fixup { files, output, .. } => {
            fixup::run_fixup(&config, &files, output.as_deref())
        }
        Commands::Shiny { input, output } => {
            shiny::run_shiny(&config, input.as_deref(), output.as_deref())
        }
        Commands::Recolor {
            input,
            shiny,
            original,
            output,
            swap,
        } => recolor::run_recolor(
            &config,
            input.as_deref(),
            shiny.as_deref(),
            original.as_deref(),
            output.as_deref(),
            swap,
        ),
        Commands::Anim { input, asm, sheet } => {
            anim::run_anim(&config, input.as_deref(), asm.as_deref(), sheet.as_deref())
        }
        Commands::Bundle {
            name,
            front,
            back,
            shiny,
            credits,
            output,
            preview,
            swap,
        } => bundle::run_bundle(
            &config,
            &bundle::BundleArgs {
                name: &name,
                front: front.as_deref(),
                back: back.as_deref(),
                shiny: shiny.as_deref(),
                credits: credits.as_deref(),
                output: output.as_deref(),
                preview: preview.as_deref(),
                swap,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fixup_defaults() {
        let cli = Cli::try_parse_from(["composer", "fixup"]).unwrap();
        match cli.command {
            Commands::Fixup {
                files,
                output,
                tolerance,
            } => {
                assert!(files.is_empty());
                assert!(output.is_none());
                assert!(tolerance.is_none());
            }
            _ => panic!("expected fixup"),
        }
    }

    #[test]
    fn test_parse_rejects_zero_tolerance() {
        assert!(Cli::try_parse_from(["composer", "fixup", "--tolerance", "0"]).is_err());
    }

    #[test]
    fn test_parse_bundle() {
        let cli = Cli::try_parse_from([
            "composer",
            "bundle",
            "abra",
            "--credits",
            "me",
            "--swap",
            "-o",
            "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Bundle {
                name,
                credits,
                output,
                swap,
                front,
                ..
            } => {
                assert_eq!(name, "abra");
                assert_eq!(credits.as_deref(), Some("me"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(swap);
                assert!(front.is_none());
            }
            _ => panic!("expected bundle"),
        }
    }

    #[test]
    fn test_parse_bundle_requires_name() {
        assert!(Cli::try_parse_from(["composer", "bundle"]).is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["composer", "anim", "-v", "--staging", "mons/abra"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.staging, Some(PathBuf::from("mons/abra")));
    }
}
