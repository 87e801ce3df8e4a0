//! Canvas geometry: how a source image is scaled and placed on the frame.
//!
//! The frame has a fixed 1200x1600 portrait panel. Landscape sources are
//! laid out on a 1600x1200 canvas scaled to its height and then turned
//! clockwise; portrait and square sources are scaled to the 1200 px width
//! and centered vertically.
//!
//! Offsets are signed: a scaled image larger than the canvas gets a negative
//! offset and is clipped by the paste.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rotation::{rotated_dimensions, QuarterTurn};

/// Short edge of the frame panel in pixels.
pub const SHORT_EDGE: u32 = 1200;
/// Long edge of the frame panel in pixels.
pub const LONG_EDGE: u32 = 1600;
/// Largest scaled edge we are willing to allocate.
pub const MAX_SCALED_EDGE: u32 = 65_535;

/// Errors produced while planning a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The source has no pixels along at least one axis.
    #[error("Source image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// The aspect ratio is so extreme that the scaled image cannot be held.
    #[error("Scaled image would be {width}x{height}, exceeding {max} px", max = MAX_SCALED_EDGE)]
    ScaledTooLarge { width: u64, height: u64 },
}

/// Which branch of the layout a source falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrientation {
    /// Strictly wider than tall.
    Landscape,
    /// Taller than wide, or square.
    Portrait,
}

impl SourceOrientation {
    /// Classify a source by its dimensions.
    pub fn of(width: u32, height: u32) -> Self {
        if width > height {
            SourceOrientation::Landscape
        } else {
            SourceOrientation::Portrait
        }
    }
}

/// The complete geometry of one normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub source_width: u32,
    pub source_height: u32,
    pub orientation: SourceOrientation,
    /// Dimensions of the uniformly scaled source.
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Dimensions of the white canvas before rotation.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Top-left position of the scaled source on the canvas.
    pub paste_x: i64,
    pub paste_y: i64,
    /// Rotation applied to the composed canvas, if any.
    pub rotation: Option<QuarterTurn>,
}

impl LayoutPlan {
    /// Uniform scale factor applied to the source.
    pub fn scale_factor(&self) -> f64 {
        match self.orientation {
            SourceOrientation::Landscape => SHORT_EDGE as f64 / self.source_height as f64,
            SourceOrientation::Portrait => SHORT_EDGE as f64 / self.source_width as f64,
        }
    }

    /// Dimensions of the finished canvas, after rotation.
    pub fn final_dimensions(&self) -> (u32, u32) {
        match self.rotation {
            Some(turn) => rotated_dimensions(self.canvas_width, self.canvas_height, turn),
            None => (self.canvas_width, self.canvas_height),
        }
    }

    /// Padding left below the pasted image along the vertical axis.
    ///
    /// Together with `paste_y` this splits the free space; odd remainders go
    /// to the bottom.
    pub fn bottom_padding(&self) -> i64 {
        self.canvas_height as i64 - self.scaled_height as i64 - self.paste_y
    }
}

/// Plan the layout for a source of the given dimensions.
///
/// # Errors
///
/// Returns `LayoutError::EmptyImage` for zero-sized sources and
/// `LayoutError::ScaledTooLarge` when the driven axis would exceed
/// [`MAX_SCALED_EDGE`].
pub fn plan_layout(width: u32, height: u32) -> Result<LayoutPlan, LayoutError> {
    if width == 0 || height == 0 {
        return Err(LayoutError::EmptyImage { width, height });
    }

    let orientation = SourceOrientation::of(width, height);

    let (scaled_width, scaled_height, canvas_width, canvas_height, rotation) = match orientation {
        SourceOrientation::Landscape => {
            let new_height = SHORT_EDGE;
            let new_width = scale_edge(new_height, height, width);
            (
                new_width,
                new_height,
                LONG_EDGE,
                SHORT_EDGE,
                Some(QuarterTurn::Clockwise),
            )
        }
        SourceOrientation::Portrait => {
            let new_width = SHORT_EDGE;
            let new_height = scale_edge(new_width, width, height);
            (new_width, new_height, SHORT_EDGE, LONG_EDGE, None)
        }
    };

    if scaled_width > MAX_SCALED_EDGE || scaled_height > MAX_SCALED_EDGE {
        return Err(LayoutError::ScaledTooLarge {
            width: scaled_width as u64,
            height: scaled_height as u64,
        });
    }

    // Horizontal placement is always flush left; only the vertical axis is centered.
    let paste_x = 0;
    let paste_y = centered_offset(canvas_height, scaled_height);

    Ok(LayoutPlan {
        source_width: width,
        source_height: height,
        orientation,
        scaled_width,
        scaled_height,
        canvas_width,
        canvas_height,
        paste_x,
        paste_y,
        rotation,
    })
}

/// Scale `other` by `target / driver`, rounding to the nearest pixel.
///
/// Saturates at `u32::MAX` so the caller's size check can reject it.
fn scale_edge(target: u32, driver: u32, other: u32) -> u32 {
    let scaled = (target as f64 / driver as f64 * other as f64).round();
    if scaled >= u32::MAX as f64 {
        u32::MAX
    } else {
        (scaled as u32).max(1)
    }
}

/// Floor-divided centering offset; negative when `content` overflows.
fn centered_offset(container: u32, content: u32) -> i64 {
    (container as i64 - content as i64).div_euclid(2)
}
