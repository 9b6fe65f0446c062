//! Hue shift search against a reference texture.

use super::buffer::PixelBuffer;
use super::histogram::{Histogram, HUE_BUCKETS};

/// Degrees covered by one hue bucket
const BUCKET_DEGREES: i32 = 10;

/// Find the hue shift that best aligns `source` with `reference`
///
/// Returns a multiple of 10 in [-180, 170]. Returns 0 when either texture
/// has no saturated pixels.
pub fn find_best_hue_shift(source: &PixelBuffer, reference: &PixelBuffer) -> i32 {
    best_shift_between(
        &Histogram::from_buffer(source),
        &Histogram::from_buffer(reference),
    )
}

/// Same search over prebuilt histograms
///
/// Each candidate rotates the normalized source distribution by whole
/// buckets and scores it by summed squared difference against the
/// reference. Ties keep the earliest (most negative) shift.
pub fn best_shift_between(source: &Histogram, reference: &Histogram) -> i32 {
    let Some(reference) = reference.normalized_hue() else {
        return 0;
    };
    let Some(source) = source.normalized_hue() else {
        return 0;
    };

    let half = HUE_BUCKETS as i32 / 2;
    let mut best_shift = 0;
    let mut best_score = f64::INFINITY;

    for shift in -half..half {
        let score = shift_score(&source, &reference, shift);
        if score < best_score {
            best_score = score;
            best_shift = shift * BUCKET_DEGREES;
        }
    }

    tracing::debug!("Best hue shift {} (score {:.6})", best_shift, best_score);
    best_shift
}

fn shift_score(source: &[f64; HUE_BUCKETS], reference: &[f64; HUE_BUCKETS], shift: i32) -> f64 {
    let mut shifted = [0.0; HUE_BUCKETS];
    for (i, &value) in source.iter().enumerate() {
        let idx = (i as i32 + shift).rem_euclid(HUE_BUCKETS as i32) as usize;
        shifted[idx] = value;
    }

    reference
        .iter()
        .zip(shifted.iter())
        .map(|(r, s)| (r - s).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::color::hsl_to_rgb;

    /// Buffer with one saturated pixel per listed hue
    fn hues(list: &[f64]) -> PixelBuffer {
        let data: Vec<u8> = list
            .iter()
            .flat_map(|&h| {
                let [r, g, b] = hsl_to_rgb(h, 100.0, 50.0);
                [r, g, b, 255]
            })
            .collect();
        PixelBuffer::from_raw(list.len() as u32, 1, data).unwrap()
    }

    #[test]
    fn test_identical_textures_shift_zero() {
        let buffer = hues(&[5.0, 5.0, 45.0, 125.0, 200.0]);
        assert_eq!(find_best_hue_shift(&buffer, &buffer), 0);
    }

    #[test]
    fn test_red_to_green() {
        let source = hues(&[5.0, 5.0, 35.0]);
        let reference = hues(&[125.0, 125.0, 155.0]);
        assert_eq!(find_best_hue_shift(&source, &reference), 120);
    }

    #[test]
    fn test_negative_shift() {
        let source = hues(&[125.0, 155.0]);
        let reference = hues(&[65.0, 95.0]);
        assert_eq!(find_best_hue_shift(&source, &reference), -60);
    }

    #[test]
    fn test_half_turn_reports_minus_180() {
        let source = hues(&[5.0]);
        let reference = hues(&[185.0]);
        assert_eq!(find_best_hue_shift(&source, &reference), -180);
    }

    #[test]
    fn test_empty_histograms_give_zero() {
        let grey = PixelBuffer::filled(4, 4, [90, 90, 90, 255]).unwrap();
        let colored = hues(&[200.0]);
        assert_eq!(find_best_hue_shift(&grey, &colored), 0);
        assert_eq!(find_best_hue_shift(&colored, &grey), 0);
    }

    #[test]
    fn test_uniform_ties_keep_first_shift() {
        // Every bucket populated equally: all shifts score 0
        let all: Vec<f64> = (0..36).map(|i| i as f64 * 10.0 + 5.0).collect();
        let buffer = hues(&all);
        assert_eq!(find_best_hue_shift(&buffer, &buffer), -180);
    }

    #[test]
    fn test_shift_score_rotation() {
        let mut source = [0.0; HUE_BUCKETS];
        source[35] = 1.0;
        let mut reference = [0.0; HUE_BUCKETS];
        reference[1] = 1.0;
        assert_eq!(shift_score(&source, &reference, 2), 0.0);
        assert_eq!(shift_score(&source, &reference, 0), 2.0);
    }
}
