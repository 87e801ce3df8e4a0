//! Quarter-turn rotation of the composed canvas.
//!
//! A quarter turn needs no interpolation; the bounds expand by swapping
//! width and height.

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

/// A rotation by 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarterTurn {
    /// 90 degrees clockwise (-90 in counter-clockwise-positive terms).
    Clockwise,
}

/// Dimensions of the bounding box after rotating a `width x height` image.
pub fn rotated_dimensions(width: u32, height: u32, turn: QuarterTurn) -> (u32, u32) {
    match turn {
        QuarterTurn::Clockwise => (height, width),
    }
}

pub fn rotate_quarter(image: &RgbImage, turn: QuarterTurn) -> RgbImage {
    match turn {
        QuarterTurn::Clockwise => imageops::rotate90(image),
    }
}
