//! Animated GIF decomposition into a spritesheet and an `anim.asm` listing
//!
//! The ROM animates front sprites by stepping through a vertical strip of
//! frames, holding each one for a number of 60 Hz game frames. The listing
//! format matches the disassembly's `frame`/`endanim` macros.

use crate::output::{save_png, write_text, OutputError};
use crate::spritesheet::{render_spritesheet, SheetError, SHEET_BACKGROUND};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Game frames per second the durations are expressed in
pub const GAME_FPS: f64 = 60.0;

/// Error type for animation conversion
#[derive(Debug, Error)]
pub enum AnimError {
    /// IO error opening the input
    #[error("failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// GIF decoding error
    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// The GIF holds no frames
    #[error("'{0}' contains no frames")]
    NoFrames(String),
    /// The frames do not fit in one spritesheet
    #[error(transparent)]
    Sheet(#[from] SheetError),
    /// Writing the sheet or listing failed
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// A decoded animation: composited frames and their display times.
#[derive(Debug, Clone)]
pub struct Animation {
    pub frames: Vec<RgbaImage>,
    /// Per-frame display time in milliseconds
    pub durations_ms: Vec<f64>,
}

/// What [`convert_animation`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimSummary {
    pub frame_count: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Durations in game frames, as written to the listing
    pub durations: Vec<u32>,
}

/// Convert a duration in milliseconds to whole game frames, truncating.
///
/// ```
/// use sprite_composer::anim::ms_to_game_frames;
///
/// assert_eq!(ms_to_game_frames(100.0), 6);
/// assert_eq!(ms_to_game_frames(70.0), 4);
/// ```
pub fn ms_to_game_frames(ms: f64) -> u32 {
    ((ms / 1000.0) * GAME_FPS) as u32
}

/// Render the `anim.asm` listing for a list of game-frame durations.
///
/// One `frame <index>, <duration>` line per frame, then `endanim`. Lines
/// are tab-indented and joined by `\n` with no trailing newline.
pub fn render_listing(durations: &[u32]) -> String {
    let mut lines: Vec<String> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| format!("\tframe {}, {:02}", i, d))
        .collect();
    lines.push("\tendanim".to_string());
    lines.join("\n")
}

/// Decode every frame of a GIF together with its delay.
pub fn load_gif(path: &Path) -> Result<Animation, AnimError> {
    let file = File::open(path).map_err(|source| AnimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let decode_err = |source| AnimError::Decode {
        path: path.display().to_string(),
        source,
    };

    let decoder = GifDecoder::new(BufReader::new(file)).map_err(decode_err)?;
    let frames = decoder.into_frames().collect_frames().map_err(decode_err)?;

    let mut durations_ms = Vec::with_capacity(frames.len());
    let mut images = Vec::with_capacity(frames.len());
    for frame in frames {
        let (numer, denom) = frame.delay().numer_denom_ms();
        durations_ms.push(numer as f64 / denom.max(1) as f64);
        images.push(frame.into_buffer());
    }
    log::debug!("{}: decoded {} frames", path.display(), images.len());

    Ok(Animation {
        frames: images,
        durations_ms,
    })
}

/// Split a GIF into a vertical spritesheet and a frame-timing listing.
pub fn convert_animation(
    gif: &Path,
    listing: &Path,
    sheet: &Path,
) -> Result<AnimSummary, AnimError> {
    let animation = load_gif(gif)?;
    let Some(first) = animation.frames.first() else {
        return Err(AnimError::NoFrames(gif.display().to_string()));
    };
    let (frame_width, frame_height) = first.dimensions();

    let durations: Vec<u32> = animation
        .durations_ms
        .iter()
        .map(|&ms| ms_to_game_frames(ms))
        .collect();
    for (i, (&ms, &d)) in animation.durations_ms.iter().zip(&durations).enumerate() {
        if d == 0 {
            log::warn!("frame {} lasts {}ms, shorter than one game frame", i, ms);
        }
    }

    let sheet_image = render_spritesheet(&animation.frames, SHEET_BACKGROUND)?;
    write_text(&render_listing(&durations), listing)?;
    save_png(&sheet_image, sheet)?;

    Ok(AnimSummary {
        frame_count: animation.frames.len(),
        frame_width,
        frame_height,
        durations,
    })
}
