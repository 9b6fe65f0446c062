//! Static previews of a texture and its histograms.
//!
//! Produces plain RGBA images for export: the head strip (top 16 rows of the
//! skin, scaled up) and bar charts of the hue and brightness histograms with
//! an optional reference overlay.

use crate::texture::histogram::{BRIGHTNESS_BUCKETS, HUE_BUCKETS};
use crate::texture::{hsl_to_rgb, Histogram, PixelBuffer};
use image::{Rgba, RgbaImage};

/// Rows of the skin that hold the head faces
const HEAD_ROWS: u32 = 16;

/// Chart background
const BACKGROUND: Rgba<u8> = Rgba([24, 24, 28, 255]);
/// Reference outline color and opacity
const OUTLINE: [u8; 3] = [255, 255, 255];
const OUTLINE_ALPHA: f64 = 0.8;
const OUTLINE_WIDTH: u32 = 2;

/// Default chart size in pixels
pub const CHART_WIDTH: u32 = 360;
pub const CHART_HEIGHT: u32 = 100;

/// Which histogram a chart shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Hue,
    Brightness,
}

impl ChartKind {
    fn buckets(self) -> usize {
        match self {
            ChartKind::Hue => HUE_BUCKETS,
            ChartKind::Brightness => BRIGHTNESS_BUCKETS,
        }
    }

    /// Bar color for bucket `i`, sampled at the bucket centre
    fn bar_color(self, i: usize) -> Rgba<u8> {
        let [r, g, b] = match self {
            ChartKind::Hue => hsl_to_rgb(i as f64 * 10.0 + 5.0, 100.0, 50.0),
            ChartKind::Brightness => {
                let n = BRIGHTNESS_BUCKETS as f64;
                hsl_to_rgb(0.0, 0.0, i as f64 / n * 100.0 + 100.0 / n / 2.0)
            }
        };
        Rgba([r, g, b, 255])
    }

    fn counts(self, histogram: &Histogram) -> &[u32] {
        match self {
            ChartKind::Hue => &histogram.hue,
            ChartKind::Brightness => &histogram.brightness,
        }
    }
}

/// Top 16 rows of a skin, enlarged with nearest-neighbour sampling
pub fn head_strip(buffer: &PixelBuffer, scale: u32) -> RgbaImage {
    let scale = scale.max(1);
    let rows = buffer.height().min(HEAD_ROWS);
    let img: RgbaImage = buffer.clone().into();

    RgbaImage::from_fn(img.width() * scale, rows * scale, |x, y| {
        *img.get_pixel(x / scale, y / scale)
    })
}

/// Draw a histogram as a bar chart
///
/// Bars share one vertical scale with the reference so the two can be
/// compared; reference buckets are drawn as outlines on top.
pub fn render_chart(
    kind: ChartKind,
    histogram: &Histogram,
    reference: Option<&Histogram>,
    width: u32,
    height: u32,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
    let counts = kind.counts(histogram);
    let ref_counts = reference.map(|r| kind.counts(r));

    let max = counts
        .iter()
        .chain(ref_counts.unwrap_or(&[]))
        .copied()
        .max()
        .unwrap_or(0);
    if max == 0 {
        return canvas;
    }

    let bar_width = width as f64 / kind.buckets() as f64;
    let bar = |i: usize, count: u32| {
        let x0 = (i as f64 * bar_width).round() as u32;
        let x1 = ((i + 1) as f64 * bar_width).round() as u32;
        let h = (count as f64 / max as f64 * height as f64).round() as u32;
        // One pixel gap between bars
        (x0, x1.saturating_sub(1).max(x0), height - h, height)
    };

    for (i, &count) in counts.iter().enumerate() {
        let (x0, x1, y0, y1) = bar(i, count);
        fill_rect(&mut canvas, x0, x1, y0, y1, kind.bar_color(i));
    }

    if let Some(ref_counts) = ref_counts {
        for (i, &count) in ref_counts.iter().enumerate().filter(|(_, c)| **c > 0) {
            let (x0, x1, y0, y1) = bar(i, count);
            stroke_rect(&mut canvas, x0, x1, y0, y1);
        }
    }

    canvas
}

/// Hues of the hue slider gradient centred on `center_hue`
///
/// Seven stops from -180 to +180 degrees in 60 degree steps.
pub fn hue_gradient_stops(center_hue: f64) -> Vec<f64> {
    (-180..=180)
        .step_by(60)
        .map(|offset| (center_hue + offset as f64).rem_euclid(360.0))
        .collect()
}

fn fill_rect(canvas: &mut RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32, color: Rgba<u8>) {
    for y in y0..y1.min(canvas.height()) {
        for x in x0..x1.min(canvas.width()) {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Blend an outline of the given rectangle onto the canvas
fn stroke_rect(canvas: &mut RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32) {
    let (w, h) = canvas.dimensions();
    for y in y0..y1.min(h) {
        for x in x0..x1.min(w) {
            let edge = x < x0 + OUTLINE_WIDTH
                || x + OUTLINE_WIDTH >= x1
                || y < y0 + OUTLINE_WIDTH
                || y + OUTLINE_WIDTH >= y1;
            if edge {
                let px = canvas.get_pixel_mut(x, y);
                for c in 0..3 {
                    let blended =
                        OUTLINE[c] as f64 * OUTLINE_ALPHA + px[c] as f64 * (1.0 - OUTLINE_ALPHA);
                    px[c] = blended.round() as u8;
                }
            }
        }
    }
}
