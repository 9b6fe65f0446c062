//! Logical head rotation.
//!
//! Turning the head moves whole faces around the cube and re-orients the
//! ones that pivot in place. Every face in both layers is read before any is
//! written, so a rotation never observes its own partial output.

use super::atlas::{extract_face, place_face, FaceName, Layer};
use super::buffer::PixelBuffer;
use super::rotate::{rotate_ccw, rotate_cw, rotate_half, FaceBuffer};
use super::{require_skin_size, TextureError};
use std::fmt;
use std::str::FromStr;

/// Head rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The rotation that undoes this one
    #[cfg(test)]
    pub fn inverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!(
                "Unknown direction '{}', expected up, down, left or right",
                s
            )),
        }
    }
}

/// Re-orientation applied to a face as it moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Keep,
    Cw,
    Ccw,
    Half,
}

impl Turn {
    fn apply(self, face: &FaceBuffer) -> FaceBuffer {
        match self {
            Turn::Keep => *face,
            Turn::Cw => rotate_cw(face),
            Turn::Ccw => rotate_ccw(face),
            Turn::Half => rotate_half(face),
        }
    }
}

/// (destination, source, turn) for every face
type Transitions = [(FaceName, FaceName, Turn); 6];

fn transitions(direction: Direction) -> Transitions {
    use FaceName::*;
    match direction {
        Direction::Up => [
            (Top, Front, Turn::Half),
            (Back, Top, Turn::Half),
            (Bottom, Back, Turn::Half),
            (Front, Bottom, Turn::Half),
            (Left, Left, Turn::Cw),
            (Right, Right, Turn::Ccw),
        ],
        Direction::Down => [
            (Bottom, Front, Turn::Half),
            (Back, Bottom, Turn::Half),
            (Top, Back, Turn::Half),
            (Front, Top, Turn::Half),
            (Left, Left, Turn::Ccw),
            (Right, Right, Turn::Cw),
        ],
        Direction::Left => [
            (Left, Front, Turn::Keep),
            (Back, Left, Turn::Keep),
            (Right, Back, Turn::Keep),
            (Front, Right, Turn::Keep),
            (Top, Top, Turn::Cw),
            (Bottom, Bottom, Turn::Ccw),
        ],
        Direction::Right => [
            (Right, Front, Turn::Keep),
            (Back, Right, Turn::Keep),
            (Left, Back, Turn::Keep),
            (Front, Left, Turn::Keep),
            (Top, Top, Turn::Ccw),
            (Bottom, Bottom, Turn::Cw),
        ],
    }
}

/// Both layers of every face, indexed by [`FaceName::index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeadFaces {
    inner: [FaceBuffer; 6],
    outer: [FaceBuffer; 6],
}

impl HeadFaces {
    fn read(buffer: &PixelBuffer) -> Result<Self, TextureError> {
        let mut faces = Self {
            inner: [FaceBuffer::default(); 6],
            outer: [FaceBuffer::default(); 6],
        };
        for name in FaceName::all() {
            for layer in Layer::all() {
                let (x, y) = name.origin(layer);
                *faces.slot_mut(name, layer) = extract_face(buffer, x, y)?;
            }
        }
        Ok(faces)
    }

    fn write(&self, buffer: &mut PixelBuffer) -> Result<(), TextureError> {
        for name in FaceName::all() {
            for layer in Layer::all() {
                let (x, y) = name.origin(layer);
                place_face(buffer, x, y, self.slot(name, layer))?;
            }
        }
        Ok(())
    }

    fn slot(&self, name: FaceName, layer: Layer) -> &FaceBuffer {
        match layer {
            Layer::Inner => &self.inner[name.index()],
            Layer::Outer => &self.outer[name.index()],
        }
    }

    fn slot_mut(&mut self, name: FaceName, layer: Layer) -> &mut FaceBuffer {
        match layer {
            Layer::Inner => &mut self.inner[name.index()],
            Layer::Outer => &mut self.outer[name.index()],
        }
    }

    /// New assignment after turning the head; `self` is left untouched
    fn turned(&self, direction: Direction) -> Self {
        let mut next = *self;
        for (dest, source, turn) in transitions(direction) {
            for layer in Layer::all() {
                *next.slot_mut(dest, layer) = turn.apply(self.slot(source, layer));
            }
        }
        next
    }
}

/// Rotate the head of a 64x64 skin in place
///
/// Non-skin-sized buffers are rejected before anything is read or written.
pub fn rotate_head(buffer: &mut PixelBuffer, direction: Direction) -> Result<(), TextureError> {
    require_skin_size(buffer)?;

    let faces = HeadFaces::read(buffer)?;
    faces.turned(direction).write(buffer)?;

    tracing::debug!("Rotated head {}", direction);
    Ok(())
}
