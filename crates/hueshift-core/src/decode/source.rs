//! Source decoding with EXIF orientation handling.
//!
//! The compositor expects an upright raster: rotation parameters are
//! relative to what the user sees, so stored orientation is corrected here.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Orientation};
use crate::raster::RasterImage;

/// Decode JPEG or PNG bytes into an upright RGBA raster.
///
/// # Errors
///
/// * `DecodeError::InvalidFormat` if the container format is not recognized
/// * `DecodeError::CorruptedFile` if the payload cannot be decoded
/// * `DecodeError::EmptyImage` if the decoded image has no pixels
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let orientation = get_orientation(bytes);
    let img = decode_dynamic(bytes)?;
    let (stored_w, stored_h) = (img.width(), img.height());

    let upright = apply_orientation(img, orientation).into_rgba8();
    let raster = RasterImage::from_rgba_image(upright);
    if raster.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: raster.width(),
            height: raster.height(),
        });
    }

    if orientation.swaps_dimensions() {
        debug_assert_eq!((raster.width(), raster.height()), (stored_h, stored_w));
        log::debug!(
            "decoded {}x{} source, stored as {}x{} ({:?})",
            raster.width(),
            raster.height(),
            stored_w,
            stored_h,
            orientation
        );
    } else {
        log::debug!(
            "decoded {}x{} source ({:?})",
            raster.width(),
            raster.height(),
            orientation
        );
    }
    Ok(raster)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat(
            "unrecognized container".to_string(),
        ));
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Read the EXIF orientation tag.
///
/// Returns `Orientation::Normal` if no EXIF data is found or the tag is
/// missing.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
