//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding rasters to JPEG with configurable quality (alpha flattened)
//! - Encoding rasters to lossless PNG (alpha preserved)
//!
//! All operations are synchronous and CPU-bound; the export adapter moves
//! them off the async executor.

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use thiserror::Error;

use crate::config::ExportFormat;
use crate::raster::RasterImage;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a raster in the requested export format.
pub fn encode(raster: &RasterImage, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Jpeg { quality } => encode_jpeg(raster, quality),
        ExportFormat::Png => encode_png(raster),
    }
}

fn validate(raster: &RasterImage) -> Result<(), EncodeError> {
    if raster.is_empty() {
        return Err(EncodeError::InvalidDimensions {
            width: raster.width(),
            height: raster.height(),
        });
    }
    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
