//! PNG and text output, plus output path generation

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Create the parent directory of `path` if it is missing.
fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file.
///
/// The format is always PNG regardless of the file extension, matching the
/// sprite pipeline which only ever hands PNGs to the ROM build.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    log::info!(
        "Wrote {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

/// Write a text listing exactly as given (no newline is appended).
pub fn write_text(contents: &str, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    std::fs::write(path, contents)?;
    log::info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Generate the path of a derived sprite variant.
///
/// | Input | Variant | Output |
/// |-------|---------|--------|
/// | `staging/back.png` | `shiny` | `staging/back_shiny.png` |
/// | `front.png` | `inverted` | `front_inverted.png` |
/// | with `-o out.png` | any | `out.png` |
pub fn variant_path(input: &Path, variant: &str, output_arg: Option<&Path>) -> PathBuf {
    if let Some(output) = output_arg {
        return output.to_path_buf();
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = input.parent().unwrap_or(Path::new(""));
    if parent.as_os_str().is_empty() {
        PathBuf::from(format!("{}_{}.png", stem, variant))
    } else {
        parent.join(format!("{}_{}.png", stem, variant))
    }
}
