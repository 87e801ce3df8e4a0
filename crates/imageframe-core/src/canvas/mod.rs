//! Frame canvas construction.
//!
//! # Pipeline
//!
//! 1. [`plan_layout`] decides orientation, scaled size, canvas size, paste
//!    offset and rotation from the source dimensions alone.
//! 2. [`compose`] resizes the source, pastes it onto a white canvas and
//!    applies the rotation.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, x grows right, y grows down
//! - Paste offsets are signed; out-of-canvas regions are clipped
//! - The only rotation is a clockwise quarter turn of the whole canvas

mod compose;
mod layout;
mod rotation;

pub use compose::{compose, BACKGROUND};
pub use layout::{
    plan_layout, LayoutError, LayoutPlan, SourceOrientation, LONG_EDGE, MAX_SCALED_EDGE,
    SHORT_EDGE,
};
pub use rotation::{rotate_quarter, rotated_dimensions, QuarterTurn};
