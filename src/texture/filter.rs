//! Per-pixel color adjustments.
//!
//! The steps run in a fixed order: hue shift, saturation/lightness offsets,
//! colorize, selective desaturation, then contrast on the RGB result.
//! Reordering them changes the output.

use super::buffer::PixelBuffer;
use super::color::{rgb_to_hsl, Hsl};
use serde::{Deserialize, Serialize};

/// Saturation (percent) at or below which colorize leaves a pixel alone
const COLORIZE_MIN_SATURATION: f64 = 5.0;

/// Adjustment parameters for [`apply_adjustments`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Hue rotation in degrees
    pub hue_shift: f64,
    /// Saturation offset in percent
    pub saturation: f64,
    /// Lightness offset in percent
    pub lightness: f64,
    /// Contrast, -255 to 255
    pub contrast: f64,
    /// Hue to pull colors towards
    pub colorize_hue: f64,
    /// Colorize strength, 0 to 1
    pub colorize_amount: f64,
    /// Hue to desaturate around
    pub target_hue: f64,
    /// Width of the desaturation window in degrees
    pub hue_range: f64,
    /// Desaturation strength at the target hue, 0 to 1
    pub grey_amount: f64,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            saturation: 0.0,
            lightness: 0.0,
            contrast: 0.0,
            colorize_hue: 0.0,
            colorize_amount: 0.0,
            target_hue: 0.0,
            hue_range: 30.0,
            grey_amount: 0.0,
        }
    }
}

impl Adjustments {
    /// True when applying these adjustments cannot change any pixel
    pub fn is_identity(&self) -> bool {
        self.hue_shift.rem_euclid(360.0) == 0.0
            && self.saturation == 0.0
            && self.lightness == 0.0
            && self.contrast == 0.0
            && self.colorize_amount <= 0.0
            && self.grey_amount <= 0.0
    }

    /// Contrast multiplier for the configured contrast value
    fn contrast_factor(&self) -> f64 {
        (259.0 * (self.contrast + 255.0)) / (255.0 * (259.0 - self.contrast))
    }

    /// Run the HSL stages on one color
    fn adjust_hsl(&self, hsl: Hsl) -> Hsl {
        let mut h = (hsl.h + self.hue_shift).rem_euclid(360.0);
        let mut s = (hsl.s + self.saturation).clamp(0.0, 100.0);
        let l = (hsl.l + self.lightness).clamp(0.0, 100.0);

        if self.colorize_amount > 0.0 && s > COLORIZE_MIN_SATURATION {
            h += (self.colorize_hue - h) * self.colorize_amount;
            h = h.rem_euclid(360.0);
        }

        // A zero-width window selects nothing
        if self.grey_amount > 0.0 && self.hue_range > 0.0 {
            let distance = hue_distance(h, self.target_hue);
            if distance <= self.hue_range {
                let influence = 1.0 - distance / self.hue_range;
                s *= 1.0 - self.grey_amount * influence;
            }
        }

        Hsl::new(h, s, l)
    }
}

/// Shortest angular distance between two hues, in [0, 180]
fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Return an adjusted copy of `buffer`
///
/// Fully transparent pixels are copied unchanged and alpha is never touched.
pub fn apply_adjustments(buffer: &PixelBuffer, adjustments: &Adjustments) -> PixelBuffer {
    let mut out = buffer.clone();
    if adjustments.is_identity() {
        return out;
    }

    let contrast = (adjustments.contrast != 0.0).then(|| adjustments.contrast_factor());

    for pixel in out.pixels_mut().filter(|p| p[3] != 0) {
        let hsl = adjustments.adjust_hsl(rgb_to_hsl(pixel[0], pixel[1], pixel[2]));
        let mut rgb = hsl.to_rgb();

        if let Some(factor) = contrast {
            rgb = rgb.map(|c| apply_contrast(c, factor));
        }

        pixel[..3].copy_from_slice(&rgb);
    }

    tracing::debug!(
        "Applied adjustments to {}x{} buffer",
        buffer.width(),
        buffer.height()
    );
    out
}

#[inline]
fn apply_contrast(channel: u8, factor: f64) -> u8 {
    (factor * (channel as f64 - 128.0) + 128.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(pixel: [u8; 4], adjustments: &Adjustments) -> [u8; 4] {
        let buffer = PixelBuffer::from_raw(1, 1, pixel.to_vec()).unwrap();
        apply_adjustments(&buffer, adjustments).get(0, 0).unwrap()
    }

    fn close(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (*x as i16 - y as i16).abs() <= 1)
    }

    #[test]
    fn test_red_to_green() {
        let buffer = PixelBuffer::filled(64, 64, [255, 0, 0, 255]).unwrap();
        let adjustments = Adjustments {
            hue_shift: 120.0,
            ..Default::default()
        };
        let out = apply_adjustments(&buffer, &adjustments);
        assert!(out.pixels().all(|p| close([p[0], p[1], p[2], p[3]], [0, 255, 0, 255])));
        // Input untouched
        assert_eq!(buffer.get(5, 5).unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_negative_hue_shift_wraps() {
        let adjustments = Adjustments {
            hue_shift: -120.0,
            ..Default::default()
        };
        assert!(close(single([255, 0, 0, 255], &adjustments), [0, 0, 255, 255]));
    }

    #[test]
    fn test_transparent_pixels_skipped() {
        let adjustments = Adjustments {
            hue_shift: 90.0,
            contrast: 100.0,
            ..Default::default()
        };
        assert_eq!(single([255, 0, 0, 0], &adjustments), [255, 0, 0, 0]);
    }

    #[test]
    fn test_alpha_preserved() {
        let adjustments = Adjustments {
            lightness: 20.0,
            ..Default::default()
        };
        assert_eq!(single([40, 80, 120, 77], &adjustments)[3], 77);
    }

    #[test]
    fn test_saturation_and_lightness_clamp() {
        let desaturate = Adjustments {
            saturation: -200.0,
            ..Default::default()
        };
        let [r, g, b, _] = single([200, 50, 50, 255], &desaturate);
        assert_eq!(r, g);
        assert_eq!(g, b);

        let white = Adjustments {
            lightness: 150.0,
            ..Default::default()
        };
        assert_eq!(single([10, 90, 30, 255], &white), [255, 255, 255, 255]);
    }

    #[test]
    fn test_colorize_skips_grey() {
        let adjustments = Adjustments {
            colorize_hue: 240.0,
            colorize_amount: 1.0,
            ..Default::default()
        };
        assert_eq!(single([128, 128, 128, 255], &adjustments), [128, 128, 128, 255]);
        assert!(close(single([255, 0, 0, 255], &adjustments), [0, 0, 255, 255]));
    }

    #[test]
    fn test_colorize_partial() {
        let adjustments = Adjustments {
            colorize_hue: 120.0,
            colorize_amount: 0.5,
            ..Default::default()
        };
        // Red (0) pulled halfway to green lands on yellow (60)
        assert!(close(single([255, 0, 0, 255], &adjustments), [255, 255, 0, 255]));
    }

    #[test]
    fn test_selective_desaturation() {
        let adjustments = Adjustments {
            target_hue: 0.0,
            hue_range: 30.0,
            grey_amount: 1.0,
            ..Default::default()
        };
        // Exactly on target: fully grey
        let [r, g, b, _] = single([255, 0, 0, 255], &adjustments);
        assert_eq!((r, g, b), (128, 128, 128));
        // Outside the window: unchanged
        assert_eq!(single([0, 255, 0, 255], &adjustments), [0, 255, 0, 255]);
    }

    #[test]
    fn test_desaturation_window_wraps() {
        let adjustments = Adjustments {
            target_hue: 355.0,
            hue_range: 20.0,
            grey_amount: 1.0,
            ..Default::default()
        };
        // Hue 0 is 5 degrees from 355, so saturation drops to 25%
        let out = single([255, 0, 0, 255], &adjustments);
        let hsl = rgb_to_hsl(out[0], out[1], out[2]);
        assert!((hsl.s - 25.0).abs() < 1.0, "saturation {}", hsl.s);
    }

    #[test]
    fn test_zero_range_desaturates_nothing() {
        let adjustments = Adjustments {
            target_hue: 0.0,
            hue_range: 0.0,
            grey_amount: 1.0,
            ..Default::default()
        };
        assert_eq!(single([255, 0, 0, 255], &adjustments), [255, 0, 0, 255]);
    }

    #[test]
    fn test_contrast() {
        let up = Adjustments {
            contrast: 128.0,
            ..Default::default()
        };
        let factor = up.contrast_factor();
        let expected = (factor * (160.0 - 128.0) + 128.0).round() as u8;
        assert_eq!(
            single([160, 160, 160, 255], &up),
            [expected, expected, expected, 255]
        );

        // Mid grey is the pivot
        assert_eq!(single([128, 128, 128, 255], &up), [128, 128, 128, 255]);

        let max = Adjustments {
            contrast: 255.0,
            ..Default::default()
        };
        assert_eq!(single([200, 50, 128, 255], &max), [255, 0, 128, 255]);
    }

    #[test]
    fn test_hue_distance() {
        assert_eq!(hue_distance(10.0, 350.0), 20.0);
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(90.0, 270.0), 180.0);
        assert_eq!(hue_distance(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_identity() {
        assert!(Adjustments::default().is_identity());
        assert!(Adjustments {
            hue_shift: 360.0,
            ..Default::default()
        }
        .is_identity());
        assert!(!Adjustments {
            contrast: -10.0,
            ..Default::default()
        }
        .is_identity());

        let buffer = PixelBuffer::filled(3, 3, [12, 34, 56, 255]).unwrap();
        assert_eq!(apply_adjustments(&buffer, &Adjustments::default()), buffer);
    }
}
