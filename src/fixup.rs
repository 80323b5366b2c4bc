//! Color-key normalization for sprite images
//!
//! A sprite ripped or drawn for the ROM must only use exact black, exact
//! white and transparency around its palette colors. Exported art usually
//! carries off-by-a-few blacks and whites plus a halo of white around the
//! silhouette. Fixing a sprite is two passes over the pixel grid:
//!
//! 1. [`normalize_color_keys`]: every pixel on its own, snap near-black and
//!    near-white to the exact key color and give transparent pixels a known
//!    RGB value.
//! 2. [`fill_transparent`]: starting from the left, right and top edges,
//!    flood through background-colored pixels and make them transparent.

use crate::color::{rgb_within_tolerance, same_rgb, BLACK, DEFAULT_TOLERANCE, WHITE};
use crate::output::{save_png, OutputError};
use image::{Rgb, RgbaImage};
use std::collections::VecDeque;
use std::path::Path;
use thiserror::Error;

/// Error type for sprite fixup
#[derive(Debug, Error)]
pub enum FixupError {
    /// Input could not be opened or decoded
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// Result could not be written
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Key colors and tolerance used by the normalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColors {
    /// Per-channel snap window half-width
    pub tolerance: u8,
    /// RGB given to fully transparent pixels
    pub transparent_fill: Rgb<u8>,
    /// Dark key, tested first
    pub dark: Rgb<u8>,
    /// Light key, tested second
    pub light: Rgb<u8>,
    /// Color erased by the border flood-fill
    pub background: Rgb<u8>,
}

impl Default for KeyColors {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            transparent_fill: WHITE,
            dark: BLACK,
            light: WHITE,
            background: WHITE,
        }
    }
}

/// Pixel counts touched by each pass, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixupStats {
    /// Transparent pixels given the fill color
    pub transparent: usize,
    /// Pixels snapped to the dark key
    pub snapped_dark: usize,
    /// Pixels snapped to the light key
    pub snapped_light: usize,
    /// Pixels made transparent by the flood-fill
    pub cleared: usize,
}

/// Snap every pixel of `grid` to the key colors.
///
/// Rules are tested in order and the first match wins:
///
/// - alpha 0: RGB becomes `keys.transparent_fill`, alpha stays 0
/// - all channels within tolerance of `keys.dark`: RGB becomes `keys.dark`
/// - all channels within tolerance of `keys.light`: RGB becomes `keys.light`
///
/// Alpha is never modified.
pub fn normalize_color_keys(grid: &mut RgbaImage, keys: &KeyColors) -> FixupStats {
    let mut stats = FixupStats::default();

    for pixel in grid.pixels_mut() {
        let target = if pixel[3] == 0 {
            stats.transparent += 1;
            keys.transparent_fill
        } else if rgb_within_tolerance(pixel, keys.dark, keys.tolerance) {
            stats.snapped_dark += 1;
            keys.dark
        } else if rgb_within_tolerance(pixel, keys.light, keys.tolerance) {
            stats.snapped_light += 1;
            keys.light
        } else {
            continue;
        };
        pixel[0] = target[0];
        pixel[1] = target[1];
        pixel[2] = target[2];
    }

    stats
}

/// Make the background reachable from the left, right and top edges transparent.
///
/// Every pixel with `x == 0`, `x == width - 1` or `y == 0` seeds the fill.
/// The bottom row is not seeded. From each seed whose RGB equals
/// `background` (alpha ignored) the fill spreads through 4-connected
/// neighbours of the same RGB, setting their alpha to 0. RGB is left
/// untouched, so running the fill twice gives the same grid.
///
/// Returns the number of pixels whose alpha changed.
pub fn fill_transparent(grid: &mut RgbaImage, background: Rgb<u8>) -> usize {
    let (width, height) = grid.dimensions();
    if width == 0 || height == 0 {
        return 0;
    }

    let mut frontier = VecDeque::new();
    for x in 0..width {
        for y in 0..height {
            if x == 0 || x == width - 1 || y == 0 {
                frontier.push_back((x, y));
            }
        }
    }

    // Cleared pixels keep their RGB and would match again without this.
    let mut visited = vec![false; width as usize * height as usize];
    let mut cleared = 0;

    while let Some((x, y)) = frontier.pop_front() {
        let index = y as usize * width as usize + x as usize;
        if visited[index] {
            continue;
        }
        visited[index] = true;

        let pixel = grid.get_pixel_mut(x, y);
        if !same_rgb(pixel, background) {
            continue;
        }
        if pixel[3] != 0 {
            pixel[3] = 0;
            cleared += 1;
        }

        if x > 0 {
            frontier.push_back((x - 1, y));
        }
        if x < width - 1 {
            frontier.push_back((x + 1, y));
        }
        if y > 0 {
            frontier.push_back((x, y - 1));
        }
        if y < height - 1 {
            frontier.push_back((x, y + 1));
        }
    }

    cleared
}

/// Run both passes over a sprite.
pub fn fixup_sprite(grid: &mut RgbaImage, keys: &KeyColors) -> FixupStats {
    let mut stats = normalize_color_keys(grid, keys);
    stats.cleared = fill_transparent(grid, keys.background);
    stats
}

/// Load `input`, fix it up and save the result to `output` as PNG.
///
/// `input` and `output` may be the same path.
pub fn fixup_file(input: &Path, output: &Path, keys: &KeyColors) -> Result<FixupStats, FixupError> {
    let mut grid = image::open(input)
        .map_err(|source| FixupError::Read {
            path: input.display().to_string(),
            source,
        })?
        .to_rgba8();

    let stats = fixup_sprite(&mut grid, keys);
    log::debug!(
        "{}: {} transparent, {} snapped dark, {} snapped light, {} cleared",
        input.display(),
        stats.transparent,
        stats.snapped_dark,
        stats.snapped_light,
        stats.cleared
    );

    save_png(&grid, output)?;
    Ok(stats)
}
