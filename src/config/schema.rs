//! Configuration schema types for `composer.toml`
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the fixed layout of the sprite staging directory.

use crate::fixup::KeyColors;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where sprite files live inside the staging directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory all other paths are relative to
    #[serde(default = "default_staging")]
    pub staging: PathBuf,
    /// Sprites normalized by `composer fixup`
    #[serde(default = "default_sprites")]
    pub sprites: Vec<PathBuf>,
    /// Shiny reference sprite
    #[serde(default = "default_shiny")]
    pub shiny: PathBuf,
    /// Sprite the shiny palette is paired against
    #[serde(default = "default_original")]
    pub original: PathBuf,
    /// Palette listing written by `composer shiny`
    #[serde(default = "default_palette")]
    pub palette: PathBuf,
    /// Animated front sprite
    #[serde(default = "default_gif")]
    pub gif: PathBuf,
    /// Frame timing listing written by `composer anim`
    #[serde(default = "default_anim")]
    pub anim: PathBuf,
    /// Spritesheet written by `composer anim`
    #[serde(default = "default_sheet")]
    pub sheet: PathBuf,
}

fn default_staging() -> PathBuf {
    PathBuf::from("pokemon-sprites-staging")
}

fn default_sprites() -> Vec<PathBuf> {
    vec![
        PathBuf::from("front.png"),
        PathBuf::from("back.png"),
        PathBuf::from("shiny.png"),
    ]
}

fn default_shiny() -> PathBuf {
    PathBuf::from("shiny.png")
}

fn default_original() -> PathBuf {
    PathBuf::from("back.png")
}

fn default_palette() -> PathBuf {
    PathBuf::from("shiny.pal")
}

fn default_gif() -> PathBuf {
    PathBuf::from("front.gif")
}

fn default_anim() -> PathBuf {
    PathBuf::from("anim.asm")
}

fn default_sheet() -> PathBuf {
    PathBuf::from("front.png")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            staging: default_staging(),
            sprites: default_sprites(),
            shiny: default_shiny(),
            original: default_original(),
            palette: default_palette(),
            gif: default_gif(),
            anim: default_anim(),
            sheet: default_sheet(),
        }
    }
}

impl PathsConfig {
    /// Resolve a configured file against the staging directory.
    pub fn staged(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.staging.join(file)
        }
    }
}

/// Color-key settings for `composer fixup`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixupConfig {
    /// Per-channel snap tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: u8,
    /// Color erased by the border flood-fill
    #[serde(default = "default_white")]
    pub background: [u8; 3],
    /// RGB given to fully transparent pixels
    #[serde(default = "default_white")]
    pub transparent_fill: [u8; 3],
}

fn default_tolerance() -> u8 {
    crate::color::DEFAULT_TOLERANCE
}

fn default_white() -> [u8; 3] {
    [255, 255, 255]
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            background: default_white(),
            transparent_fill: default_white(),
        }
    }
}

impl FixupConfig {
    /// Key colors for the fixup passes.
    pub fn key_colors(&self) -> KeyColors {
        KeyColors {
            tolerance: self.tolerance,
            transparent_fill: Rgb(self.transparent_fill),
            background: Rgb(self.background),
            ..KeyColors::default()
        }
    }
}

/// Settings for `composer bundle`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Credits stored in the archives
    #[serde(default)]
    pub credits: String,
    /// Directory the archives are written to (default: the staging directory)
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Complete composer.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,
    /// Color-key settings
    #[serde(default)]
    pub fixup: FixupConfig,
    /// Import bundle settings
    #[serde(default)]
    pub bundle: BundleConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "fixup.tolerance")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "composer.toml: '{}' {}", self.field, self.message)
    }
}

/// Largest accepted snap tolerance
pub const MAX_TOLERANCE: u8 = 128;

impl ComposerConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.fixup.tolerance == 0 || self.fixup.tolerance > MAX_TOLERANCE {
            errors.push(ConfigValidationError {
                field: "fixup.tolerance".to_string(),
                message: format!("must be between 1 and {}", MAX_TOLERANCE),
            });
        }

        if self.paths.sprites.is_empty() {
            errors.push(ConfigValidationError {
                field: "paths.sprites".to_string(),
                message: "must list at least one sprite".to_string(),
            });
        }

        errors
    }
}
