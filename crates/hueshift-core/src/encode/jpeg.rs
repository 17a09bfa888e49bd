//! JPEG encoding for export.
//!
//! JPEG has no alpha channel, so RGBA input is flattened over black before
//! encoding. Transparent canvas regions left by rotation come out black.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};
use crate::raster::RasterImage;

/// Encode a raster to JPEG bytes.
///
/// # Arguments
///
/// * `raster` - RGBA raster to encode
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for the photo library
/// * 60-80: Medium quality, acceptable for sharing
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(raster: &RasterImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    validate(raster)?;

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let rgb = flatten_over_black(raster.pixels());

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(&rgb, raster.width(), raster.height(), ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Drop alpha by compositing each pixel over opaque black.
fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * a + 127) / 255) as u8);
        }
    }
    rgb
}
