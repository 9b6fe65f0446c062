//! Skin editing session.
//!
//! Holds the texture being edited alongside its pristine copy and an optional
//! reference texture, and exposes the editor's commands on top of the
//! texture engine.

pub mod preview;
pub mod source;

pub use source::{load_texture, SourceError};

use crate::texture::{
    apply_adjustments, average_hue, clear_outer_layer, find_best_hue_shift, require_skin_size,
    parse_color_hue, rotate_head, Adjustments, Direction, Histogram, PixelBuffer, TextureError,
};
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

/// Editor errors
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Export failed: {0}")]
    Export(#[from] image::ImageError),

    #[error("Texture must be 64x64 pixels (Minecraft skin format), got {width}x{height}")]
    NotSkinSized { width: u32, height: u32 },

    #[error("No reference texture loaded")]
    NoReference,

    #[error("Unrecognised color '{0}', expected #rrggbb or r,g,b")]
    InvalidColor(String),
}

/// Editing state for one skin
///
/// Rotations and layer clearing change the working texture; adjustments are
/// only applied when rendering, so they can be changed freely.
#[derive(Debug, Clone)]
pub struct EditSession {
    pristine: PixelBuffer,
    working: PixelBuffer,
    reference: Option<PixelBuffer>,
    adjustments: Adjustments,
}

impl EditSession {
    /// Start editing a skin; rejects anything that is not 64x64
    pub fn new(skin: PixelBuffer) -> Result<Self, EditorError> {
        if require_skin_size(&skin).is_err() {
            return Err(EditorError::NotSkinSized {
                width: skin.width(),
                height: skin.height(),
            });
        }

        tracing::info!("Editing session started");
        Ok(Self {
            working: skin.clone(),
            pristine: skin,
            reference: None,
            adjustments: Adjustments::default(),
        })
    }

    pub fn pristine(&self) -> &PixelBuffer {
        &self.pristine
    }

    pub fn adjustments(&self) -> &Adjustments {
        &self.adjustments
    }

    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments;
    }

    /// Reference textures may be any size
    pub fn set_reference(&mut self, reference: PixelBuffer) {
        tracing::info!(
            "Reference texture set ({}x{})",
            reference.width(),
            reference.height()
        );
        self.reference = Some(reference);
    }

    /// Turn the head of the working texture
    pub fn rotate(&mut self, direction: Direction) -> Result<(), EditorError> {
        rotate_head(&mut self.working, direction)?;
        Ok(())
    }

    /// Drop the hat layer of the working texture
    pub fn clear_outer_layer(&mut self) -> Result<(), EditorError> {
        clear_outer_layer(&mut self.working)?;
        Ok(())
    }

    /// Set the hue shift that best matches the reference and return it
    ///
    /// Compares the pristine texture, so earlier hue edits do not bias the
    /// match.
    pub fn match_reference_hue(&mut self) -> Result<i32, EditorError> {
        let reference = self.reference.as_ref().ok_or(EditorError::NoReference)?;
        let shift = find_best_hue_shift(&self.pristine, reference);

        tracing::info!("Matched reference hue: shift {}", shift);
        self.adjustments.hue_shift = shift as f64;
        Ok(shift)
    }

    /// Point colorize at the hue of a typed color, keeping the amount
    pub fn set_colorize_from(&mut self, color: &str) -> Result<f64, EditorError> {
        let hue =
            parse_color_hue(color).ok_or_else(|| EditorError::InvalidColor(color.to_string()))?;
        self.adjustments.colorize_hue = hue;
        Ok(hue)
    }

    /// Working texture with the current adjustments applied
    pub fn render(&self) -> PixelBuffer {
        apply_adjustments(&self.working, &self.adjustments)
    }

    /// Histograms of the rendered texture and of the reference, if any
    pub fn histograms(&self) -> (Histogram, Option<Histogram>) {
        (
            Histogram::from_buffer(&self.render()),
            self.reference.as_ref().map(Histogram::from_buffer),
        )
    }

    /// Average hue of the pristine texture
    pub fn average_hue(&self) -> f64 {
        average_hue(&self.pristine)
    }

    /// Render and write the result as a PNG
    pub fn export_png<P: AsRef<Path>>(&self, path: P) -> Result<(), EditorError> {
        save_png(self.render(), path)
    }
}

/// Write a buffer to disk; the format follows the file extension
pub fn save_png<P: AsRef<Path>>(buffer: PixelBuffer, path: P) -> Result<(), EditorError> {
    let path = path.as_ref();
    let img: RgbaImage = buffer.into();
    img.save(path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
