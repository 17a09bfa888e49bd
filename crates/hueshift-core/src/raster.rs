//! The pixel buffer passed between pipeline stages.
//!
//! Every stage takes a `&RasterImage` and returns a new one. Pixels are
//! stored as straight-alpha RGBA, 8 bits per channel, in row-major order.

use thiserror::Error;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Errors raised when building a raster from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    /// Pixel buffer length doesn't match `width * height * 4`
    #[error("Pixel buffer size mismatch: expected {expected} bytes (width * height * 4), got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// An RGBA raster image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a raster from dimensions and RGBA pixel data.
    ///
    /// Zero-sized rasters are allowed so that degenerate inputs can be
    /// detected by the stages that consume them.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = buffer_len(width, height);
        if pixels.len() != expected {
            return Err(RasterError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a raster where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Internal constructor for buffers whose length is already known to match.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            buffer_len(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::from_parts(width, height, img.into_raw())
    }

    /// Convert to an `image::RgbaImage` for use with `image` operations.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the raster and return its RGBA bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/degenerate image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[inline]
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let img = RasterImage::new(100, 50, vec![0u8; 100 * 50 * 4]).unwrap();

        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.byte_size(), 20000);
        assert!(!img.is_empty());
    }

    #[test]
    fn test_raster_size_mismatch() {
        let result = RasterImage::new(10, 10, vec![0u8; 10 * 10 * 3]);
        assert_eq!(
            result,
            Err(RasterError::BufferSizeMismatch {
                expected: 400,
                actual: 300
            })
        );
    }

    #[test]
    fn test_raster_empty() {
        let img = RasterImage::new(0, 0, vec![]).unwrap();
        assert!(img.is_empty());

        let img = RasterImage::new(0, 10, vec![]).unwrap();
        assert!(img.is_empty());
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let img = RasterImage::filled(3, 2, [255, 0, 0, 255]);
        assert_eq!(img.byte_size(), 3 * 2 * 4);
        assert_eq!(img.pixel(2, 1), Some([255, 0, 0, 255]));
        assert_eq!(img.pixel(3, 0), None);
        assert_eq!(img.pixel(0, 2), None);
    }

    #[test]
    fn test_rgba_image_roundtrip_preserves_layout() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(1, 0, image::Rgba([1, 2, 3, 4]));

        let raster = RasterImage::from_rgba_image(img);
        assert_eq!(raster.pixel(1, 0), Some([1, 2, 3, 4]));

        let back = raster.to_rgba_image().unwrap();
        assert_eq!(back.get_pixel(1, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_raster_error_display() {
        let err = RasterError::BufferSizeMismatch {
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Pixel buffer size mismatch: expected 4 bytes (width * height * 4), got 3"
        );
    }
}
