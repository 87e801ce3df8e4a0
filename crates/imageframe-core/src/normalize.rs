//! One-shot normalization of a fetched asset into the frame canvas.
//!
//! `normalize` takes the raw bytes returned by the photo server and produces
//! a [`NormalizedCanvas`]: a 1200x1600 RGB buffer with the source scaled
//! uniformly, letterboxed on white and turned upright for the panel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::{compose, plan_layout, LayoutError, LayoutPlan};
use crate::decode::{decode_image, decode_image_oriented, DecodeError, DecodedImage, FilterType};

/// Errors that can occur during normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The asset bytes could not be decoded, or resampling failed.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The source dimensions cannot be laid out on the canvas.
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
}

/// Tunables for a normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Resampling filter used when scaling the source.
    pub filter: FilterType,
    /// Honor the EXIF orientation tag before deciding the layout.
    pub apply_exif_orientation: bool,
}

/// The finished canvas together with the geometry that produced it.
#[derive(Debug, Clone)]
pub struct NormalizedCanvas {
    pub image: DecodedImage,
    pub layout: LayoutPlan,
}

impl NormalizedCanvas {
    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }
}

/// Decode `bytes` and render them onto the frame canvas.
pub fn normalize(
    bytes: &[u8],
    options: &NormalizeOptions,
) -> Result<NormalizedCanvas, NormalizeError> {
    let source = if options.apply_exif_orientation {
        decode_image_oriented(bytes)?
    } else {
        decode_image(bytes)?
    };
    normalize_image(&source, options)
}

/// Render an already decoded image onto the frame canvas.
pub fn normalize_image(
    source: &DecodedImage,
    options: &NormalizeOptions,
) -> Result<NormalizedCanvas, NormalizeError> {
    let layout = plan_layout(source.width, source.height)?;
    let image = compose(source, &layout, options.filter)?;

    debug_assert_eq!((image.width, image.height), layout.final_dimensions());

    Ok(NormalizedCanvas { image, layout })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{SourceOrientation, BACKGROUND};
    use image::ImageFormat;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 90])
        });
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_normalize_landscape_800x400() {
        let canvas = normalize(&png_bytes(800, 400), &NormalizeOptions::default()).unwrap();

        assert_eq!(canvas.layout.orientation, SourceOrientation::Landscape);
        assert_eq!(
            (canvas.layout.scaled_width, canvas.layout.scaled_height),
            (2400, 1200)
        );
        assert_eq!((canvas.width(), canvas.height()), (1200, 1600));
    }

    #[test]
    fn test_normalize_portrait_pads_vertically() {
        let canvas = normalize(&png_bytes(300, 350), &NormalizeOptions::default()).unwrap();

        assert_eq!(canvas.layout.orientation, SourceOrientation::Portrait);
        assert_eq!(canvas.layout.scaled_height, 1400);
        assert_eq!(canvas.layout.paste_y, 100);
        assert_eq!((canvas.width(), canvas.height()), (1200, 1600));
        assert_eq!(canvas.image.pixel(0, 0), Some(BACKGROUND));
        assert_eq!(canvas.image.pixel(1199, 1599), Some(BACKGROUND));
    }

    #[test]
    fn test_normalize_is_bit_identical_for_same_bytes() {
        let bytes = png_bytes(123, 77);
        let options = NormalizeOptions::default();

        let first = normalize(&bytes, &options).unwrap();
        let second = normalize(&bytes, &options).unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(first.layout, second.layout);
    }

    #[test]
    fn test_normalize_rejects_non_image() {
        let result = normalize(b"<html>not found</html>", &NormalizeOptions::default());
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn test_normalize_image_rejects_empty_source() {
        let empty = DecodedImage::new(0, 0, vec![]);
        let result = normalize_image(&empty, &NormalizeOptions::default());
        assert!(matches!(
            result,
            Err(NormalizeError::Layout(LayoutError::EmptyImage { .. }))
        ));
    }

    #[test]
    fn test_exif_option_without_tag_matches_default() {
        let bytes = png_bytes(40, 30);
        let plain = normalize(&bytes, &NormalizeOptions::default()).unwrap();
        let oriented = normalize(
            &bytes,
            &NormalizeOptions {
                apply_exif_orientation: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plain.image, oriented.image);
    }
}
