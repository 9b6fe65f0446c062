//! Hue and brightness histograms.

use super::buffer::PixelBuffer;
use super::color::{rgb_to_hsl, Hsl};
use serde::{Serialize, Serializer};

/// Number of 10 degree hue buckets
pub const HUE_BUCKETS: usize = 36;
/// Number of lightness buckets
pub const BRIGHTNESS_BUCKETS: usize = 30;

/// Saturation (percent) below which a pixel's hue is treated as noise
const GREY_SATURATION: f64 = 10.0;

/// How a saturation exactly at the grey cut-off is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GreyCutoff {
    /// Saturation equal to the cut-off still carries hue
    Inclusive,
    /// Saturation must exceed the cut-off
    Exclusive,
}

/// A non-transparent pixel, with whether its hue is meaningful
struct Sample {
    hsl: Hsl,
    has_hue: bool,
}

/// Shared pixel predicate for hue analysis
///
/// Transparent pixels yield `None`; everything else yields its HSL with
/// `has_hue` cleared for near-grey pixels.
fn sample(pixel: &[u8], cutoff: GreyCutoff) -> Option<Sample> {
    if pixel[3] == 0 {
        return None;
    }
    let hsl = rgb_to_hsl(pixel[0], pixel[1], pixel[2]);
    let has_hue = match cutoff {
        GreyCutoff::Inclusive => hsl.s >= GREY_SATURATION,
        GreyCutoff::Exclusive => hsl.s > GREY_SATURATION,
    };
    Some(Sample { hsl, has_hue })
}

/// Mean hue of the opaque, saturated pixels in degrees
///
/// This is a plain arithmetic mean, not a circular one: reds that straddle
/// 0/360 average out near 180. Returns 0 when no pixel qualifies.
pub fn average_hue(buffer: &PixelBuffer) -> f64 {
    let (sum, count) = buffer
        .pixels()
        .filter_map(|p| sample(p, GreyCutoff::Inclusive))
        .filter(|s| s.has_hue)
        .fold((0.0, 0u32), |(sum, count), s| (sum + s.hsl.h, count + 1));

    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Hue and brightness bucket counts for one buffer snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    #[serde(serialize_with = "counts_as_seq")]
    pub hue: [u32; HUE_BUCKETS],
    #[serde(serialize_with = "counts_as_seq")]
    pub brightness: [u32; BRIGHTNESS_BUCKETS],
}

// serde only implements arrays up to 32 elements
fn counts_as_seq<S: Serializer, const N: usize>(
    counts: &[u32; N],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(counts)
}

impl Histogram {
    /// Count every opaque pixel into the brightness buckets, and the
    /// saturated ones into the hue buckets
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let mut hue = [0u32; HUE_BUCKETS];
        let mut brightness = [0u32; BRIGHTNESS_BUCKETS];

        for s in buffer
            .pixels()
            .filter_map(|p| sample(p, GreyCutoff::Exclusive))
        {
            if s.has_hue {
                hue[hue_bucket(s.hsl.h)] += 1;
            }
            brightness[brightness_bucket(s.hsl.l)] += 1;
        }

        Self { hue, brightness }
    }

    pub fn hue_total(&self) -> u32 {
        self.hue.iter().sum()
    }

    pub fn brightness_total(&self) -> u32 {
        self.brightness.iter().sum()
    }

    /// Hue buckets scaled to sum to 1, or `None` for an empty histogram
    pub fn normalized_hue(&self) -> Option<[f64; HUE_BUCKETS]> {
        let total = self.hue_total();
        if total == 0 {
            return None;
        }
        Some(self.hue.map(|count| count as f64 / total as f64))
    }
}

fn hue_bucket(h: f64) -> usize {
    (h / 10.0).floor() as usize % HUE_BUCKETS
}

fn brightness_bucket(l: f64) -> usize {
    ((l / (100.0 / BRIGHTNESS_BUCKETS as f64)).floor() as usize).min(BRIGHTNESS_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(pixels: &[[u8; 4]]) -> PixelBuffer {
        PixelBuffer::from_raw(pixels.len() as u32, 1, pixels.concat()).unwrap()
    }

    #[test]
    fn test_average_hue_pure_red() {
        let buffer = PixelBuffer::filled(64, 64, [255, 0, 0, 255]).unwrap();
        assert_eq!(average_hue(&buffer), 0.0);
    }

    #[test]
    fn test_average_hue_skips_transparent_and_grey() {
        let buffer = buffer_of(&[
            [0, 255, 0, 255],     // 120
            [0, 0, 255, 255],     // 240
            [255, 0, 0, 0],       // transparent
            [128, 128, 128, 255], // grey
        ]);
        assert!((average_hue(&buffer) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_hue_empty_is_zero() {
        let buffer = buffer_of(&[[10, 10, 10, 255], [200, 0, 0, 0]]);
        assert_eq!(average_hue(&buffer), 0.0);
    }

    #[test]
    fn test_average_hue_is_not_circular() {
        // Hues near 10 and 350 average to 180, not 0
        let a = rgb_to_hsl(255, 42, 0).h;
        let b = rgb_to_hsl(255, 0, 42).h;
        let buffer = buffer_of(&[[255, 42, 0, 255], [255, 0, 42, 255]]);
        assert!((average_hue(&buffer) - (a + b) / 2.0).abs() < 1e-9);
        assert!((average_hue(&buffer) - 180.0).abs() < 1.0);
    }

    #[test]
    fn test_histogram_buckets() {
        let buffer = buffer_of(&[
            [255, 0, 0, 255],     // hue 0, lightness 50
            [0, 255, 0, 255],     // hue 120
            [0, 0, 255, 255],     // hue 240
            [255, 255, 255, 255], // grey, lightness 100
            [0, 0, 0, 255],       // grey, lightness 0
            [9, 9, 9, 0],         // transparent
        ]);
        let hist = Histogram::from_buffer(&buffer);

        assert_eq!(hist.hue[0], 1);
        assert_eq!(hist.hue[12], 1);
        assert_eq!(hist.hue[24], 1);
        assert_eq!(hist.hue_total(), 3);

        assert_eq!(hist.brightness[15], 3);
        assert_eq!(hist.brightness[29], 1);
        assert_eq!(hist.brightness[0], 1);
        assert_eq!(hist.brightness_total(), 5);
    }

    #[test]
    fn test_saturation_cutoffs_differ_at_boundary() {
        // s == 10 exactly: l = 0.5, d = 0.1 -> channels 0.55 / 0.45
        let hsl = Hsl::new(0.0, 10.0, 50.0);
        let [r, g, b] = hsl.to_rgb();
        let measured = rgb_to_hsl(r, g, b).s;
        let pixel = [r, g, b, 255];

        let inclusive = sample(&pixel, GreyCutoff::Inclusive).unwrap();
        let exclusive = sample(&pixel, GreyCutoff::Exclusive).unwrap();
        assert_eq!(inclusive.has_hue, measured >= 10.0);
        assert_eq!(exclusive.has_hue, measured > 10.0);
        assert!(sample(&[r, g, b, 0], GreyCutoff::Inclusive).is_none());
    }

    #[test]
    fn test_totals_match_opaque_count() {
        let mut pixels = Vec::new();
        for i in 0..=255u8 {
            pixels.push([i, 255 - i, i / 2, if i % 7 == 0 { 0 } else { 255 }]);
        }
        let buffer = buffer_of(&pixels);
        let hist = Histogram::from_buffer(&buffer);

        let opaque = pixels.iter().filter(|p| p[3] != 0).count() as u32;
        let grey = pixels
            .iter()
            .filter(|p| p[3] != 0 && rgb_to_hsl(p[0], p[1], p[2]).s <= 10.0)
            .count() as u32;

        assert_eq!(hist.brightness_total(), opaque);
        assert_eq!(hist.hue_total() + grey, opaque);
    }

    #[test]
    fn test_normalized_hue() {
        let empty = Histogram::from_buffer(&buffer_of(&[[50, 50, 50, 255]]));
        assert!(empty.normalized_hue().is_none());

        let hist = Histogram::from_buffer(&buffer_of(&[
            [255, 0, 0, 255],
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
        ]));
        let norm = hist.normalized_hue().unwrap();
        assert!((norm[0] - 0.5).abs() < 1e-12);
        assert!((norm[12] - 0.25).abs() < 1e-12);
        assert!((norm.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bucket_indices() {
        assert_eq!(hue_bucket(0.0), 0);
        assert_eq!(hue_bucket(9.999), 0);
        assert_eq!(hue_bucket(10.0), 1);
        assert_eq!(hue_bucket(359.9), 35);
        assert_eq!(brightness_bucket(0.0), 0);
        assert_eq!(brightness_bucket(3.4), 1);
        assert_eq!(brightness_bucket(100.0), 29);
    }

    #[test]
    fn test_serializes_as_arrays() {
        let buffer = PixelBuffer::filled(2, 2, [255, 0, 0, 255]).unwrap();
        let json = serde_json::to_value(Histogram::from_buffer(&buffer)).unwrap();
        let hue = json["hue"].as_array().unwrap();
        assert_eq!(hue.len(), HUE_BUCKETS);
        assert_eq!(hue[0], 4);
        assert_eq!(json["brightness"].as_array().unwrap().len(), BRIGHTNESS_BUCKETS);
    }
}
