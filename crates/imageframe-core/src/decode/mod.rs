//! Image decoding for the frame pipeline.
//!
//! This module provides functionality for:
//! - Decoding the fetched asset bytes (JPEG, PNG, WebP, GIF)
//! - Optional EXIF orientation correction
//! - Resizing with a selectable resampling filter
//!
//! All operations are synchronous and allocate new buffers; callers running
//! inside an async runtime should move them onto a blocking thread.

mod resize;
mod source;
mod types;

pub use resize::resize;
pub use source::{decode_image, decode_image_oriented};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
