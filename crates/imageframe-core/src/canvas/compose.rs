//! Letterbox composition: scale the source and paste it onto a white canvas.

use image::{imageops, Rgb, RgbImage};

use crate::decode::{resize, DecodeError, DecodedImage, FilterType};

use super::layout::LayoutPlan;
use super::rotation::rotate_quarter;

/// Canvas fill color (opaque white).
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Render the source onto the canvas described by `plan`.
///
/// Scales the source to the planned size, pastes it onto a white canvas at
/// the planned offset and applies the planned rotation. Any part of the
/// scaled source outside the canvas is clipped, so negative offsets are
/// valid.
///
/// # Errors
///
/// Returns a `DecodeError` if the resize fails.
pub fn compose(
    source: &DecodedImage,
    plan: &LayoutPlan,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    let scaled = resize(source, plan.scaled_width, plan.scaled_height, filter)?
        .into_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Scaled buffer size mismatch".to_string()))?;

    let mut canvas = RgbImage::from_pixel(plan.canvas_width, plan.canvas_height, Rgb(BACKGROUND));
    imageops::replace(&mut canvas, &scaled, plan.paste_x, plan.paste_y);

    let canvas = match plan.rotation {
        Some(turn) => rotate_quarter(&canvas, turn),
        None => canvas,
    };

    Ok(DecodedImage::from_rgb_image(canvas))
}
