//! ImageFrame Core - canvas normalization library
//!
//! This crate turns a photo, as fetched from the photo server, into the
//! fixed 1200x1600 canvas shown on the frame: decode, uniform scale,
//! letterbox on white, and a quarter turn for landscape shots. It also
//! encodes the result for whatever displays it.
//!
//! Everything here is synchronous and free of I/O.

pub mod canvas;
pub mod decode;
pub mod encode;
pub mod normalize;

pub use canvas::{plan_layout, LayoutPlan, QuarterTurn, SourceOrientation};
pub use decode::{DecodeError, DecodedImage, FilterType};
pub use encode::{encode_canvas, EncodeError, OutputFormat};
pub use normalize::{
    normalize, normalize_image, NormalizeError, NormalizeOptions, NormalizedCanvas,
};
