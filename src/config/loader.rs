//! Configuration loading and discovery for `composer.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ComposerConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for when no `--config` is given
pub const CONFIG_FILE: &str = "composer.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse composer.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the staging directory
    pub staging: Option<PathBuf>,
    /// Override the snap tolerance
    pub tolerance: Option<u8>,
}

/// Find composer.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find composer.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a composer.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one. If no config file is found, returns the
/// default configuration.
///
/// A relative `paths.staging` or `bundle.output` in a loaded file is
/// resolved against the directory holding that file.
pub fn load_config(path: Option<&Path>) -> Result<ComposerConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("Loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(ComposerConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ComposerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: ComposerConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = path.parent() {
        config.paths.staging = resolve_path(root, &config.paths.staging);
        config.bundle.output = config
            .bundle
            .output
            .as_deref()
            .map(|output| resolve_path(root, output));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged
/// configuration is validated again.
pub fn merge_cli_overrides(
    config: &mut ComposerConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(ref staging) = overrides.staging {
        config.paths.staging = staging.clone();
    }

    if let Some(tolerance) = overrides.tolerance {
        config.fixup.tolerance = tolerance;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Resolve a path relative to a root directory.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
