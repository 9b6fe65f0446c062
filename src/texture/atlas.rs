//! Head face layout within the 64x64 skin atlas.
//!
//! Each head face occupies an 8x8 block in two places: the inner (base)
//! layer and the outer (hat) layer.

use super::buffer::PixelBuffer;
use super::rotate::{FaceBuffer, FACE_SIZE};
use super::{require_skin_size, TextureError};
use std::fmt;
use std::str::FromStr;

/// The six sides of the head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceName {
    Top,
    Bottom,
    Right,
    Front,
    Left,
    Back,
}

/// Skin layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Inner,
    Outer,
}

/// Top-left corners of a face in both layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceOrigins {
    pub inner: (u32, u32),
    pub outer: (u32, u32),
}

/// Face positions in the skin texture
pub const FACE_LAYOUT: [(FaceName, FaceOrigins); 6] = [
    (FaceName::Top, FaceOrigins { inner: (8, 0), outer: (40, 0) }),
    (FaceName::Bottom, FaceOrigins { inner: (16, 0), outer: (48, 0) }),
    (FaceName::Right, FaceOrigins { inner: (0, 8), outer: (32, 8) }),
    (FaceName::Front, FaceOrigins { inner: (8, 8), outer: (40, 8) }),
    (FaceName::Left, FaceOrigins { inner: (16, 8), outer: (48, 8) }),
    (FaceName::Back, FaceOrigins { inner: (24, 8), outer: (56, 8) }),
];

/// Outer-layer head band cleared by [`clear_outer_layer`]
const OUTER_BAND_X: std::ops::Range<u32> = 32..64;
const OUTER_BAND_Y: std::ops::Range<u32> = 0..16;

impl FaceName {
    /// All faces in layout order
    pub fn all() -> [FaceName; 6] {
        FACE_LAYOUT.map(|(name, _)| name)
    }

    /// Position in [`FACE_LAYOUT`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn origins(self) -> FaceOrigins {
        FACE_LAYOUT[self.index()].1
    }

    /// Top-left corner of this face in the given layer
    pub fn origin(self, layer: Layer) -> (u32, u32) {
        let origins = self.origins();
        match layer {
            Layer::Inner => origins.inner,
            Layer::Outer => origins.outer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceName::Top => "top",
            FaceName::Bottom => "bottom",
            FaceName::Right => "right",
            FaceName::Front => "front",
            FaceName::Left => "left",
            FaceName::Back => "back",
        }
    }
}

impl fmt::Display for FaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FaceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaceName::all()
            .into_iter()
            .find(|face| face.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown face '{}'", s))
    }
}

impl Layer {
    pub fn all() -> [Layer; 2] {
        [Layer::Inner, Layer::Outer]
    }
}

/// Copy the 8x8 block whose top-left corner is (x, y)
pub fn extract_face(buffer: &PixelBuffer, x: u32, y: u32) -> Result<FaceBuffer, TextureError> {
    buffer.check_region(x, y, FACE_SIZE)?;

    let mut face = FaceBuffer::default();
    for fy in 0..FACE_SIZE {
        face.row_mut(fy as usize)
            .copy_from_slice(buffer.row_span(x, y + fy, FACE_SIZE));
    }
    Ok(face)
}

/// Write an 8x8 face into `buffer` at (x, y), in place
///
/// The region is checked before anything is written.
pub fn place_face(
    buffer: &mut PixelBuffer,
    x: u32,
    y: u32,
    face: &FaceBuffer,
) -> Result<(), TextureError> {
    buffer.check_region(x, y, FACE_SIZE)?;

    for fy in 0..FACE_SIZE {
        buffer
            .row_span_mut(x, y + fy, FACE_SIZE)
            .copy_from_slice(face.row(fy as usize));
    }
    Ok(())
}

/// Make the whole outer-layer head band transparent, in place
///
/// Only alpha changes; RGB values inside the band are kept.
pub fn clear_outer_layer(buffer: &mut PixelBuffer) -> Result<(), TextureError> {
    require_skin_size(buffer)?;

    let width = OUTER_BAND_X.end - OUTER_BAND_X.start;
    for y in OUTER_BAND_Y {
        buffer
            .row_span_mut(OUTER_BAND_X.start, y, width)
            .chunks_exact_mut(4)
            .for_each(|pixel| pixel[3] = 0);
    }

    tracing::debug!("Cleared outer head layer");
    Ok(())
}
