//! Pipeline configuration.
//!
//! Configuration is handed in by the host per session. Nothing is read from
//! disk and nothing is persisted.

use serde::{Deserialize, Serialize};

use crate::transform::InterpolationFilter;
use crate::DEFAULT_MAX_OUTPUT_DIMENSION;

/// Quality used for JPEG export (highest quality).
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Longest edge of the live preview.
pub const DEFAULT_PREVIEW_MAX_EDGE: u32 = 1024;

/// Encoded format of the exported asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossy JPEG at the given quality (1-100). Alpha is flattened over black.
    Jpeg { quality: u8 },
    /// Lossless PNG, alpha preserved.
    Png,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExportFormat {
    /// MIME type reported to the persistence sink.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Png => "png",
        }
    }
}

/// Settings shared by every pipeline invocation in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Longest edge allowed on the composed canvas
    pub max_output_dimension: u32,
    /// Resampling filter used by the geometry compositor
    pub interpolation: InterpolationFilter,
    /// Format of the exported asset
    pub export_format: ExportFormat,
    /// Longest edge of the live preview
    pub preview_max_edge: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_output_dimension: DEFAULT_MAX_OUTPUT_DIMENSION,
            interpolation: InterpolationFilter::default(),
            export_format: ExportFormat::default(),
            preview_max_edge: DEFAULT_PREVIEW_MAX_EDGE,
        }
    }
}
