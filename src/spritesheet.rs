//! Spritesheet rendering - stacks animation frames into one static image

use image::{imageops, Rgba, RgbaImage};
use thiserror::Error;

/// Background of cells not covered by a frame
pub const SHEET_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Error type for spritesheet rendering
#[derive(Debug, Error)]
pub enum SheetError {
    /// The stacked height does not fit in a `u32`
    #[error("{frames} frames of height {frame_height} do not fit in one spritesheet")]
    TooTall { frames: usize, frame_height: u32 },
}

/// Stack frames top to bottom into a single spritesheet.
///
/// Every cell has the size of the first frame. Frame `i` replaces the
/// pixels of the cell at `(0, i * height)`, alpha included; a frame larger
/// than the first one is clipped to its cell's right edge and the sheet's
/// bottom, a smaller one leaves `background` showing.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use sprite_composer::spritesheet::{render_spritesheet, SHEET_BACKGROUND};
///
/// let frame = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
/// let sheet = render_spritesheet(&[frame.clone(), frame.clone(), frame], SHEET_BACKGROUND)?;
/// assert_eq!(sheet.width(), 2);
/// assert_eq!(sheet.height(), 6);
/// # Ok::<(), sprite_composer::spritesheet::SheetError>(())
/// ```
pub fn render_spritesheet(
    frames: &[RgbaImage],
    background: Rgba<u8>,
) -> Result<RgbaImage, SheetError> {
    let Some(first) = frames.first() else {
        return Ok(RgbaImage::from_pixel(1, 1, background));
    };

    let (width, height) = first.dimensions();
    let Some(sheet_height) = sheet_height(height, frames.len()) else {
        return Err(SheetError::TooTall {
            frames: frames.len(),
            frame_height: height,
        });
    };
    let mut sheet = RgbaImage::from_pixel(width, sheet_height, background);

    for (i, frame) in frames.iter().enumerate() {
        imageops::replace(&mut sheet, frame, 0, i as i64 * height as i64);
    }

    Ok(sheet)
}

/// Height of `count` stacked cells, or `None` if it overflows.
fn sheet_height(frame_height: u32, count: usize) -> Option<u32> {
    u32::try_from(count)
        .ok()
        .and_then(|count| frame_height.checked_mul(count))
}
