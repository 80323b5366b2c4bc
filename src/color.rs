//! Color helpers for color-key handling and GBC palette quantization
//!
//! Sprites handed to the ROM use three keyed colors: opaque black, opaque
//! white and fully transparent. Everything else is a palette color that
//! ends up quantized to the console's 5-bit channels.

use image::{Rgb, Rgba};

/// Opaque white, the erasable background of a sprite
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Opaque black, the outline color of a sprite
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Default per-channel tolerance used when snapping to a key color
pub const DEFAULT_TOLERANCE: u8 = 8;

/// Width of a GBC color channel step (8-bit value / 8 = 5-bit value)
const GBC_CHANNEL_STEP: u8 = 8;

/// Drop the alpha channel of a pixel.
pub fn rgb_of(pixel: &Rgba<u8>) -> Rgb<u8> {
    Rgb([pixel[0], pixel[1], pixel[2]])
}

/// Compare the visible color of a pixel against an RGB triple, ignoring alpha.
pub fn same_rgb(pixel: &Rgba<u8>, color: Rgb<u8>) -> bool {
    pixel[0] == color[0] && pixel[1] == color[1] && pixel[2] == color[2]
}

/// Sum of the RGB channels, used as a cheap brightness measure.
pub fn brightness(color: Rgb<u8>) -> u32 {
    color.0.iter().map(|&c| c as u32).sum()
}

/// Sum of all four channels, alpha included.
pub fn channel_sum(color: &Rgba<u8>) -> u32 {
    color.0.iter().map(|&c| c as u32).sum()
}

/// Check whether `value` lies strictly inside `(reference - tolerance, reference + tolerance)`.
///
/// The window is not clamped to `0..=255`, so for `reference = 0` and a
/// tolerance of 8 it accepts `0..=7`, and for `reference = 255` it accepts
/// `248..=255`.
///
/// ```
/// use sprite_composer::color::within_tolerance;
///
/// assert!(within_tolerance(7, 0, 8));
/// assert!(!within_tolerance(8, 0, 8));
/// assert!(within_tolerance(248, 255, 8));
/// assert!(!within_tolerance(247, 255, 8));
/// ```
pub fn within_tolerance(value: u8, reference: u8, tolerance: u8) -> bool {
    let value = value as i16;
    let reference = reference as i16;
    let tolerance = tolerance as i16;
    value > reference - tolerance && value < reference + tolerance
}

/// Check every RGB channel of `pixel` against `reference` with [`within_tolerance`].
pub fn rgb_within_tolerance(pixel: &Rgba<u8>, reference: Rgb<u8>, tolerance: u8) -> bool {
    (0..3).all(|i| within_tolerance(pixel[i], reference[i], tolerance))
}

/// Quantize an 8-bit channel to the GBC's 5-bit range (floor division by 8).
pub fn to_gbc_channel(value: u8) -> u8 {
    value / GBC_CHANNEL_STEP
}

/// Quantize all three channels of a color.
pub fn to_gbc(color: Rgb<u8>) -> [u8; 3] {
    [
        to_gbc_channel(color[0]),
        to_gbc_channel(color[1]),
        to_gbc_channel(color[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_tolerance_low_reference() {
        assert!(within_tolerance(0, 0, 8));
        assert!(within_tolerance(7, 0, 8));
        assert!(!within_tolerance(8, 0, 8));
        assert!(!within_tolerance(200, 0, 8));
    }

    #[test]
    fn test_within_tolerance_high_reference() {
        assert!(within_tolerance(255, 255, 8));
        assert!(within_tolerance(248, 255, 8));
        assert!(!within_tolerance(247, 255, 8));
    }

    #[test]
    fn test_within_tolerance_mid_reference_is_strict() {
        assert!(within_tolerance(121, 128, 8));
        assert!(within_tolerance(135, 128, 8));
        assert!(!within_tolerance(120, 128, 8));
        assert!(!within_tolerance(136, 128, 8));
    }

    #[test]
    fn test_rgb_within_tolerance_requires_all_channels() {
        assert!(rgb_within_tolerance(&Rgba([3, 5, 7, 255]), BLACK, 8));
        assert!(!rgb_within_tolerance(&Rgba([3, 5, 9, 255]), BLACK, 8));
        assert!(rgb_within_tolerance(&Rgba([250, 252, 255, 0]), WHITE, 8));
    }

    #[test]
    fn test_same_rgb_ignores_alpha() {
        assert!(same_rgb(&Rgba([255, 255, 255, 0]), WHITE));
        assert!(same_rgb(&Rgba([255, 255, 255, 255]), WHITE));
        assert!(!same_rgb(&Rgba([255, 255, 254, 255]), WHITE));
    }

    #[test]
    fn test_to_gbc_floors() {
        assert_eq!(to_gbc_channel(0), 0);
        assert_eq!(to_gbc_channel(7), 0);
        assert_eq!(to_gbc_channel(8), 1);
        assert_eq!(to_gbc_channel(255), 31);
        assert_eq!(to_gbc(Rgb([248, 104, 16])), [31, 13, 2]);
    }

    #[test]
    fn test_brightness_and_channel_sum() {
        assert_eq!(brightness(WHITE), 765);
        assert_eq!(brightness(BLACK), 0);
        assert_eq!(channel_sum(&Rgba([1, 2, 3, 4])), 10);
    }
}
