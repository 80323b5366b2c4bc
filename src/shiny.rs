//! Shiny palette inference and recoloring
//!
//! A GBC sprite has two palette slots besides black and white. The shiny
//! variant of a sprite only swaps those two colors, so the `.pal` entry can
//! be read straight off a shiny reference image.

use crate::color::{brightness, channel_sum, rgb_of, to_gbc, BLACK, WHITE};
use image::{Rgb, Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

/// Error type for palette inference
#[derive(Debug, Error)]
pub enum PaletteError {
    /// Input could not be opened or decoded
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// The image has fewer than two non-key colors
    #[error("expected 2 palette colors besides black, white and transparent, found {found}")]
    NotEnoughColors { found: usize },
    /// Shiny and original images do not line up
    #[error("image sizes differ: shiny is {shiny:?}, original is {original:?}")]
    SizeMismatch {
        shiny: (u32, u32),
        original: (u32, u32),
    },
}

/// Pixels ignored when looking for palette colors.
const KEY_PIXELS: [Rgba<u8>; 4] = [
    Rgba([0, 0, 0, 255]),
    Rgba([255, 255, 255, 255]),
    Rgba([0, 0, 0, 0]),
    Rgba([255, 255, 255, 0]),
];

/// The two palette colors of a shiny sprite, brighter one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShinyPalette {
    pub light: Rgba<u8>,
    pub dark: Rgba<u8>,
}

impl ShinyPalette {
    /// Render the `.pal` listing for this palette.
    ///
    /// The listing starts and ends with an empty line and holds one
    /// `RGB` line per color with 5-bit channels.
    ///
    /// ```
    /// use image::Rgba;
    /// use sprite_composer::shiny::ShinyPalette;
    ///
    /// let palette = ShinyPalette {
    ///     light: Rgba([255, 255, 152, 255]),
    ///     dark: Rgba([216, 104, 200, 255]),
    /// };
    /// assert_eq!(palette.to_pal(), "\n\tRGB 31, 31, 19\n\tRGB 27, 13, 25\n");
    /// ```
    pub fn to_pal(&self) -> String {
        let mut lines = vec![String::new()];
        for color in [self.light, self.dark] {
            let [r, g, b] = to_gbc(rgb_of(&color));
            lines.push(format!("\tRGB {:02}, {:02}, {:02}", r, g, b));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Find the two palette colors of a shiny sprite.
///
/// Pixels are scanned column by column. Exact black, exact white and the
/// two fully transparent forms of them are skipped. The first color found
/// becomes the first palette color. After that, any color matching neither
/// palette color replaces the second one and the scan moves on to the next
/// column, so the last new color seen wins the second slot. The pair is
/// ordered so the color with the larger channel sum (alpha included) comes
/// first.
pub fn infer_palette(image: &RgbaImage) -> Result<ShinyPalette, PaletteError> {
    let (width, height) = image.dimensions();
    let mut first: Option<Rgba<u8>> = None;
    let mut second: Option<Rgba<u8>> = None;

    for x in 0..width {
        for y in 0..height {
            let pixel = *image.get_pixel(x, y);
            if KEY_PIXELS.contains(&pixel) || first == Some(pixel) || second == Some(pixel) {
                continue;
            }
            log::info!("Found palette color {:?} at ({}, {})", pixel.0, x, y);
            if first.is_none() {
                first = Some(pixel);
            } else {
                second = Some(pixel);
                break;
            }
        }
    }

    match (first, second) {
        (Some(a), Some(b)) => {
            if channel_sum(&a) < channel_sum(&b) {
                Ok(ShinyPalette { light: b, dark: a })
            } else {
                Ok(ShinyPalette { light: a, dark: b })
            }
        }
        (Some(_), None) => Err(PaletteError::NotEnoughColors { found: 1 }),
        _ => Err(PaletteError::NotEnoughColors { found: 0 }),
    }
}

/// Load a shiny sprite and infer its palette.
pub fn infer_palette_file(path: &Path) -> Result<ShinyPalette, PaletteError> {
    let image = open_rgba(path)?;
    infer_palette(&image)
}

pub(crate) fn open_rgba(path: &Path) -> Result<RgbaImage, PaletteError> {
    Ok(image::open(path)
        .map_err(|source| PaletteError::Read {
            path: path.display().to_string(),
            source,
        })?
        .to_rgba8())
}

/// Mapping from the two palette colors of a normal sprite to its shiny ones.
///
/// Each pair is `(original, shiny)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalettePair {
    pub dark: (Rgba<u8>, Rgba<u8>),
    pub light: (Rgba<u8>, Rgba<u8>),
}

impl PalettePair {
    /// Cross the shiny colors over, giving the inverted shiny variant.
    pub fn swap(&self) -> PalettePair {
        PalettePair {
            dark: (self.dark.0, self.light.1),
            light: (self.light.0, self.dark.1),
        }
    }

    /// The shiny half of the mapping.
    pub fn shiny(&self) -> ShinyPalette {
        ShinyPalette {
            light: self.light.1,
            dark: self.dark.1,
        }
    }
}

/// Pair up the palette colors of a shiny sprite with the original sprite.
///
/// Over all shiny pixels whose RGB is neither black nor white, the darkest
/// and brightest (by RGB sum) are picked; the original pixel at the same
/// coordinate is recorded alongside. The first pixel of a given brightness
/// wins ties. Both images must have the same size and should already be
/// fixed up.
pub fn pair_palette(shiny: &RgbaImage, original: &RgbaImage) -> Result<PalettePair, PaletteError> {
    if shiny.dimensions() != original.dimensions() {
        return Err(PaletteError::SizeMismatch {
            shiny: shiny.dimensions(),
            original: original.dimensions(),
        });
    }

    let opaque = |c: Rgb<u8>| Rgba([c[0], c[1], c[2], 255]);
    let mut min = opaque(WHITE);
    let mut min_original = opaque(WHITE);
    let mut max = opaque(BLACK);
    let mut max_original = opaque(BLACK);
    let mut found = 0;

    for (x, y, pixel) in shiny.enumerate_pixels() {
        let rgb = rgb_of(pixel);
        if rgb == BLACK || rgb == WHITE {
            continue;
        }
        found += 1;
        if brightness(rgb) > brightness(rgb_of(&max)) {
            max = *pixel;
            max_original = *original.get_pixel(x, y);
        }
        if brightness(rgb) < brightness(rgb_of(&min)) {
            min = *pixel;
            min_original = *original.get_pixel(x, y);
        }
    }

    if found == 0 {
        return Err(PaletteError::NotEnoughColors { found: 0 });
    }

    Ok(PalettePair {
        dark: (min_original, min),
        light: (max_original, max),
    })
}

/// Load a shiny and an original sprite and pair their palettes.
pub fn pair_palette_files(shiny: &Path, original: &Path) -> Result<PalettePair, PaletteError> {
    pair_palette(&open_rgba(shiny)?, &open_rgba(original)?)
}

/// Recolor a sprite with a palette mapping.
///
/// Pixels exactly equal to an original color become the matching shiny
/// color; all other pixels are copied.
pub fn recolor(image: &RgbaImage, pair: &PalettePair) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        if *pixel == pair.dark.0 {
            *pixel = pair.dark.1;
        } else if *pixel == pair.light.0 {
            *pixel = pair.light.1;
        }
    }
    out
}
