//! Import bundles: a converted sprite set packed into zip archives
//!
//! A conversion takes the animated front sprite, the back sprite and the
//! shiny reference, fixes all of them up and derives the shiny and inverted
//! variants from the paired palette. Two archives are written from it:
//!
//! - `<name>.zip`: `front.png` (first frame), `back.png`, `data.json` and
//!   every frame as `animation/<i>.png`
//! - `<name>-v08.zip`: the frames stacked into `front.png`, `back.png`,
//!   `anim.asm`, `credits.txt` and `shiny.pal`

use crate::anim::{load_gif, ms_to_game_frames, render_listing, AnimError, Animation};
use crate::fixup::{fixup_sprite, KeyColors};
use crate::output::{save_png, variant_path, OutputError};
use crate::shiny::{open_rgba, pair_palette, recolor, PaletteError, PalettePair, ShinyPalette};
use crate::spritesheet::{render_spritesheet, SheetError};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Background of the stacked `front.png` in the v0.8 archive
pub const STACKED_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Error type for bundle conversion and export
#[derive(Debug, Error)]
pub enum BundleError {
    /// Bundles are named after the sprite and need a name
    #[error("bundle name must not be empty")]
    EmptyName,
    /// The front animation holds no frames
    #[error("front animation contains no frames")]
    NoFrames,
    /// Reading the front animation failed
    #[error(transparent)]
    Anim(#[from] AnimError),
    /// Reading or pairing the back and shiny sprites failed
    #[error(transparent)]
    Palette(#[from] PaletteError),
    /// Stacking the frames failed
    #[error(transparent)]
    Sheet(#[from] SheetError),
    /// Writing a preview image failed
    #[error(transparent)]
    Output(#[from] OutputError),
    /// Creating or writing an archive failed
    #[error("failed to write '{path}': {source}")]
    Archive {
        path: String,
        #[source]
        source: ZipError,
    },
    /// Encoding an archive entry failed
    #[error("failed to encode '{entry}': {source}")]
    Encode {
        entry: String,
        #[source]
        source: image::ImageError,
    },
    /// Serializing `data.json` failed
    #[error("failed to serialize data.json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A fixed-up sprite set with its shiny and inverted variants.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub front: Vec<RgbaImage>,
    pub front_shiny: Vec<RgbaImage>,
    pub front_inverted: Vec<RgbaImage>,
    pub back: RgbaImage,
    pub back_shiny: RgbaImage,
    pub back_inverted: RgbaImage,
    /// Mapping read off the shiny reference and the back sprite
    pub palette: PalettePair,
    /// Per-frame display time of `front` in milliseconds
    pub durations_ms: Vec<f64>,
}

impl Conversion {
    /// Fix up every frame plus the back and shiny sprites, then derive the
    /// shiny and inverted variants.
    ///
    /// The palette is paired between the shiny reference and the back
    /// sprite, so those two must have the same size.
    pub fn new(
        animation: Animation,
        mut back: RgbaImage,
        mut shiny: RgbaImage,
        keys: &KeyColors,
    ) -> Result<Self, BundleError> {
        let Animation {
            frames: mut front,
            durations_ms,
        } = animation;
        if front.is_empty() {
            return Err(BundleError::NoFrames);
        }

        for frame in &mut front {
            fixup_sprite(frame, keys);
        }
        fixup_sprite(&mut back, keys);
        fixup_sprite(&mut shiny, keys);

        let palette = pair_palette(&shiny, &back)?;
        let inverted = palette.swap();
        log::debug!(
            "Palette mapping: dark {:?} light {:?}",
            palette.dark,
            palette.light
        );

        Ok(Self {
            front_shiny: front.iter().map(|f| recolor(f, &palette)).collect(),
            front_inverted: front.iter().map(|f| recolor(f, &inverted)).collect(),
            back_shiny: recolor(&back, &palette),
            back_inverted: recolor(&back, &inverted),
            front,
            back,
            palette,
            durations_ms,
        })
    }

    /// Load the three source files and convert them.
    pub fn load(
        front: &Path,
        back: &Path,
        shiny: &Path,
        keys: &KeyColors,
    ) -> Result<Self, BundleError> {
        let animation = load_gif(front)?;
        Self::new(animation, open_rgba(back)?, open_rgba(shiny)?, keys)
    }

    /// Write every image of the conversion as a PNG into `dir`.
    ///
    /// Frames are named `front_<i>.png`, with `_shiny` and `_inverted`
    /// variants next to them; the back sprite follows the same pattern.
    pub fn write_preview(&self, dir: &Path) -> Result<(), BundleError> {
        for (i, frame) in self.front.iter().enumerate() {
            let path = dir.join(format!("front_{}.png", i));
            save_png(frame, &path)?;
            save_png(&self.front_shiny[i], &variant_path(&path, "shiny", None))?;
            save_png(
                &self.front_inverted[i],
                &variant_path(&path, "inverted", None),
            )?;
        }

        let path = dir.join("back.png");
        save_png(&self.back, &path)?;
        save_png(&self.back_shiny, &variant_path(&path, "shiny", None))?;
        save_png(&self.back_inverted, &variant_path(&path, "inverted", None))?;
        Ok(())
    }
}

/// User-supplied bundle settings.
#[derive(Debug, Clone, Copy)]
pub struct BundleOptions<'a> {
    /// File name stem of both archives
    pub name: &'a str,
    /// Free-form credits stored in `data.json` and `credits.txt`
    pub credits: &'a str,
    /// Export the inverted shiny palette instead
    pub swap: bool,
}

/// The archives written by [`write_bundles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePaths {
    pub archive: PathBuf,
    pub v08: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BundleData<'a> {
    animation_frame_durations: Vec<u64>,
    credits: &'a str,
    palette: BundlePalette,
}

#[derive(Serialize)]
struct BundlePalette {
    color1: ColorPair,
    color2: ColorPair,
}

/// An `(original, shiny)` pair as hex strings.
#[derive(Serialize)]
struct ColorPair {
    first: String,
    second: String,
}

impl ColorPair {
    fn new((original, shiny): (Rgba<u8>, Rgba<u8>)) -> Self {
        Self {
            first: hex_no_alpha(original),
            second: hex_no_alpha(shiny),
        }
    }
}

/// Format a color as `#rrggbb`, dropping alpha.
///
/// ```
/// use image::Rgba;
/// use sprite_composer::bundle::hex_no_alpha;
///
/// assert_eq!(hex_no_alpha(Rgba([216, 104, 200, 255])), "#d868c8");
/// ```
pub fn hex_no_alpha(color: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Render `data.json`: frame durations in whole milliseconds, the credits
/// and both palette pairs, dark pair first.
pub fn render_data_json(
    conversion: &Conversion,
    palette: &PalettePair,
    credits: &str,
) -> Result<String, BundleError> {
    let data = BundleData {
        animation_frame_durations: conversion
            .durations_ms
            .iter()
            .map(|&ms| ms as u64)
            .collect(),
        credits,
        palette: BundlePalette {
            color1: ColorPair::new(palette.dark),
            color2: ColorPair::new(palette.light),
        },
    };
    Ok(serde_json::to_string(&data)?)
}

/// Render the `shiny.pal` listing of the v0.8 archive.
///
/// Its first line holds the original light color and its second line the
/// shiny dark color.
pub fn render_v08_palette(palette: &PalettePair) -> String {
    ShinyPalette {
        light: palette.light.0,
        dark: palette.dark.1,
    }
    .to_pal()
}

/// Write `<name>.zip` and `<name>-v08.zip` into `dir`.
pub fn write_bundles(
    conversion: &Conversion,
    options: &BundleOptions,
    dir: &Path,
) -> Result<BundlePaths, BundleError> {
    if options.name.is_empty() {
        return Err(BundleError::EmptyName);
    }
    let palette = if options.swap {
        conversion.palette.swap()
    } else {
        conversion.palette
    };

    let mut archive = Archive::create(&dir.join(format!("{}.zip", options.name)))?;
    archive.add_png("front.png", &conversion.front[0])?;
    archive.add_png("back.png", &conversion.back)?;
    let data = render_data_json(conversion, &palette, options.credits)?;
    archive.add_bytes("data.json", data.as_bytes())?;
    for (i, frame) in conversion.front.iter().enumerate() {
        archive.add_png(&format!("animation/{}.png", i), frame)?;
    }
    let archive = archive.finish()?;

    let durations: Vec<u32> = conversion
        .durations_ms
        .iter()
        .map(|&ms| ms_to_game_frames(ms))
        .collect();
    let stacked = render_spritesheet(&conversion.front, STACKED_BACKGROUND)?;

    let mut v08 = Archive::create(&dir.join(format!("{}-v08.zip", options.name)))?;
    v08.add_png("front.png", &stacked)?;
    v08.add_png("back.png", &conversion.back)?;
    v08.add_bytes("anim.asm", render_listing(&durations).as_bytes())?;
    v08.add_bytes("credits.txt", options.credits.as_bytes())?;
    v08.add_bytes("shiny.pal", render_v08_palette(&palette).as_bytes())?;
    let v08 = v08.finish()?;

    Ok(BundlePaths { archive, v08 })
}

/// A zip archive being written entry by entry.
struct Archive {
    path: PathBuf,
    zip: ZipWriter<BufWriter<File>>,
}

impl Archive {
    fn create(path: &Path) -> Result<Self, BundleError> {
        let io_err = |source: std::io::Error| BundleError::Archive {
            path: path.display().to_string(),
            source: source.into(),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let file = File::create(path).map_err(io_err)?;
        Ok(Self {
            path: path.to_path_buf(),
            zip: ZipWriter::new(BufWriter::new(file)),
        })
    }

    fn error(&self, source: ZipError) -> BundleError {
        BundleError::Archive {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn start(&mut self, entry: &str) -> Result<(), BundleError> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(entry, options)
            .map_err(|e| self.error(e))
    }

    fn add_bytes(&mut self, entry: &str, bytes: &[u8]) -> Result<(), BundleError> {
        self.start(entry)?;
        self.zip.write_all(bytes).map_err(|e| self.error(e.into()))
    }

    fn add_png(&mut self, entry: &str, image: &RgbaImage) -> Result<(), BundleError> {
        self.start(entry)?;
        PngEncoder::new(&mut self.zip)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ColorType::Rgba8,
            )
            .map_err(|source| BundleError::Encode {
                entry: entry.to_string(),
                source,
            })
    }

    fn finish(mut self) -> Result<PathBuf, BundleError> {
        let mut writer = self.zip.finish().map_err(|e| self.error(e))?;
        writer.flush().map_err(|e| self.error(e.into()))?;
        log::info!("Wrote {}", self.path.display());
        Ok(self.path)
    }
}
