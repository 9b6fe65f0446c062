//! Quarter and half turns of a single 8x8 face.

use super::buffer::{PixelBuffer, Rgba};
use super::TextureError;

/// Edge length of a face in pixels
pub const FACE_SIZE: u32 = 8;
pub(crate) const FACE_BYTES: usize = (FACE_SIZE * FACE_SIZE * 4) as usize;
const LAST: usize = FACE_SIZE as usize - 1;

/// One 8x8 RGBA face, sized by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBuffer([u8; FACE_BYTES]);

impl Default for FaceBuffer {
    fn default() -> Self {
        Self([0; FACE_BYTES])
    }
}

impl FaceBuffer {
    pub fn from_bytes(bytes: [u8; FACE_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FACE_BYTES] {
        &self.0
    }

    #[inline]
    fn index(x: usize, y: usize) -> usize {
        (y * FACE_SIZE as usize + x) * 4
    }

    /// Pixel at (x, y); both must be below 8
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let i = Self::index(x, y);
        [self.0[i], self.0[i + 1], self.0[i + 2], self.0[i + 3]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Rgba) {
        let i = Self::index(x, y);
        self.0[i..i + 4].copy_from_slice(&pixel);
    }

    /// Row `y` as raw bytes
    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let start = Self::index(0, y);
        &self.0[start..start + FACE_SIZE as usize * 4]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = Self::index(0, y);
        &mut self.0[start..start + FACE_SIZE as usize * 4]
    }

    /// Build a new face by sending each source (x, y) to `dest(x, y)`
    fn remap(&self, dest: impl Fn(usize, usize) -> (usize, usize)) -> Self {
        let mut out = Self::default();
        for y in 0..=LAST {
            for x in 0..=LAST {
                let (dx, dy) = dest(x, y);
                out.set_pixel(dx, dy, self.pixel(x, y));
            }
        }
        out
    }
}

impl TryFrom<&PixelBuffer> for FaceBuffer {
    type Error = TextureError;

    fn try_from(buffer: &PixelBuffer) -> Result<Self, Self::Error> {
        let wrong_size = || TextureError::BufferLength {
            expected: FACE_BYTES,
            actual: buffer.as_bytes().len(),
        };
        if buffer.width() != FACE_SIZE {
            return Err(wrong_size());
        }
        let bytes: [u8; FACE_BYTES] = buffer.as_bytes().try_into().map_err(|_| wrong_size())?;
        Ok(Self(bytes))
    }
}

/// Rotate 90 degrees clockwise: (x, y) moves to (7 - y, x)
pub fn rotate_cw(face: &FaceBuffer) -> FaceBuffer {
    face.remap(|x, y| (LAST - y, x))
}

/// Rotate 90 degrees counter-clockwise: (x, y) moves to (y, 7 - x)
pub fn rotate_ccw(face: &FaceBuffer) -> FaceBuffer {
    face.remap(|x, y| (y, LAST - x))
}

/// Rotate 180 degrees: (x, y) moves to (7 - x, 7 - y)
pub fn rotate_half(face: &FaceBuffer) -> FaceBuffer {
    face.remap(|x, y| (LAST - x, LAST - y))
}
