//! RGBA pixel buffer.
//!
//! Row-major, 4 bytes per pixel. The byte length always equals
//! `width * height * 4`; nothing in the crate resizes a buffer in place.

use super::rotate::{FaceBuffer, FACE_SIZE};
use super::TextureError;
use image::RgbaImage;

/// One RGBA pixel
pub type Rgba = [u8; 4];

/// Owned width x height RGBA buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSized);
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        })
    }

    /// Create a buffer where every pixel has the same value
    pub fn filled(width: u32, height: u32, pixel: Rgba) -> Result<Self, TextureError> {
        let mut buffer = Self::new(width, height)?;
        buffer
            .data
            .chunks_exact_mut(4)
            .for_each(|p| p.copy_from_slice(&pixel));
        Ok(buffer)
    }

    /// Wrap raw RGBA bytes
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSized);
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::BufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate over pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(4)
    }

    /// Mutable pixel iteration in row-major order
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(4)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte offset of a pixel, or an error if it lies outside the buffer
    fn offset(&self, x: u32, y: u32) -> Result<usize, TextureError> {
        if x >= self.width || y >= self.height {
            return Err(TextureError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Read one pixel
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba, TextureError> {
        let i = self.offset(x, y)?;
        Ok([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Write one pixel
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba) -> Result<(), TextureError> {
        let i = self.offset(x, y)?;
        self.data[i..i + 4].copy_from_slice(&pixel);
        Ok(())
    }

    /// Check that an area of `size` x `size` pixels at (x, y) fits inside the buffer
    pub fn check_region(&self, x: u32, y: u32, size: u32) -> Result<(), TextureError> {
        let fits_x = x.checked_add(size).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(size).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(TextureError::OutOfBounds {
                x: x.saturating_add(size).saturating_sub(1),
                y: y.saturating_add(size).saturating_sub(1),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Bytes of `len` pixels of row `y` starting at column `x`
    pub(crate) fn row_span(&self, x: u32, y: u32, len: u32) -> &[u8] {
        let start = (y as usize * self.width as usize + x as usize) * 4;
        &self.data[start..start + len as usize * 4]
    }

    pub(crate) fn row_span_mut(&mut self, x: u32, y: u32, len: u32) -> &mut [u8] {
        let start = (y as usize * self.width as usize + x as usize) * 4;
        &mut self.data[start..start + len as usize * 4]
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = TextureError;

    fn try_from(img: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }
}

impl From<FaceBuffer> for PixelBuffer {
    fn from(face: FaceBuffer) -> Self {
        Self {
            width: FACE_SIZE,
            height: FACE_SIZE,
            data: face.as_bytes().to_vec(),
        }
    }
}

impl From<PixelBuffer> for RgbaImage {
    fn from(buffer: PixelBuffer) -> Self {
        // Length invariant holds, so this cannot fail
        RgbaImage::from_raw(buffer.width, buffer.height, buffer.data)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }
}
