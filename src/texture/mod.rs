//! Skin texture engine.
//!
//! Pure transforms and analysis over in-memory RGBA buffers: color-space
//! conversion, histograms, hue matching, and the face atlas / head rotation
//! algebra of the 64x64 skin layout.

pub mod atlas;
pub mod buffer;
pub mod color;
pub mod filter;
pub mod head;
pub mod histogram;
pub mod matcher;
pub mod rotate;

pub use atlas::clear_outer_layer;
pub use buffer::PixelBuffer;
pub use color::{hsl_to_rgb, parse_color_hue};
pub use filter::{apply_adjustments, Adjustments};
pub use head::{rotate_head, Direction};
pub use histogram::{average_hue, Histogram};
pub use matcher::{best_shift_between, find_best_hue_shift};

use thiserror::Error;

/// Width and height of a skin texture
pub const SKIN_SIZE: u32 = 64;

/// Texture engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    #[error("Pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Texture must be {expected}x{expected} pixels, got {width}x{height}", expected = SKIN_SIZE)]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("Buffer dimensions must be non-zero")]
    ZeroSized,
}

/// Reject anything that is not a 64x64 skin before touching it
pub fn require_skin_size(buffer: &PixelBuffer) -> Result<(), TextureError> {
    if buffer.width() != SKIN_SIZE || buffer.height() != SKIN_SIZE {
        return Err(TextureError::InvalidDimensions {
            width: buffer.width(),
            height: buffer.height(),
        });
    }
    Ok(())
}
