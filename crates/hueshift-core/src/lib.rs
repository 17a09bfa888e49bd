//! HueShift Core - photo transform pipeline
//!
//! This crate turns a source photo plus a handful of user-chosen parameters
//! into a finished image ready for the photo library:
//!
//! 1. [`transform::compose`] - bounded canvas, centered rotation, uniform downscale
//! 2. [`adjustments::apply_color`] - hue rotation, then saturation, then brightness
//! 3. [`export::ExportAdapter`] - encode and hand off to a [`export::PhotoLibrary`]
//!
//! [`pipeline::Pipeline`] chains the stages with boundary validation, and
//! [`preview::render_preview`] renders the fast live-preview variant.

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod luminance;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod transform;

pub use adjustments::{apply_color, ColorError};
pub use config::{ExportFormat, PipelineConfig};
pub use export::{
    AuthorizationStatus, EncodedAsset, ExportAdapter, ExportError, ExportHandle, ExportReceipt,
    ExportResult, PhotoLibrary, SinkError,
};
pub use pipeline::{Pipeline, PipelineError};
pub use raster::{RasterError, RasterImage};
pub use transform::{compose, ComposeError, InterpolationFilter};

/// Longest edge allowed on the composed output canvas.
pub const DEFAULT_MAX_OUTPUT_DIMENSION: u32 = 4000;

/// Rejected transform parameters.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ParameterError {
    /// A float field is NaN or infinite
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// User-chosen parameters for one export.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformParameters {
    /// Hue rotation in degrees (-180 to 180, wraps)
    pub hue_degrees: f32,
    /// Saturation multiplier (0 to 2, 1 = unchanged)
    pub saturation_factor: f32,
    /// Brightness offset added to every channel (0 to 2)
    pub brightness_offset: f32,
    /// Clockwise rotation in degrees
    pub rotation_degrees: f64,
    /// Maximum width or height of the composed canvas
    pub max_output_dimension: u32,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self {
            hue_degrees: 0.0,
            saturation_factor: 1.0,
            brightness_offset: 0.0,
            rotation_degrees: 0.0,
            max_output_dimension: DEFAULT_MAX_OUTPUT_DIMENSION,
        }
    }
}

impl TransformParameters {
    /// Create parameters with the neutral color values and no rotation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create parameters for the three color sliders, leaving geometry at its defaults
    pub fn with_color(hue_degrees: f32, saturation_factor: f32, brightness_offset: f32) -> Self {
        Self {
            hue_degrees,
            saturation_factor,
            brightness_offset,
            ..Self::default()
        }
    }

    /// Hue wrapped into the signed range (-180, 180].
    pub fn normalized_hue_degrees(&self) -> f32 {
        let wrapped = self.hue_degrees.rem_euclid(360.0);
        if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    /// Reject NaN or infinite values in any float field.
    ///
    /// Out-of-range finite values are allowed; the stages clamp their results.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let fields = [
            ("hueDegrees", self.hue_degrees as f64),
            ("saturationFactor", self.saturation_factor as f64),
            ("brightnessOffset", self.brightness_offset as f64),
            ("rotationDegrees", self.rotation_degrees),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some(&(field, _)) => Err(ParameterError::NonFinite { field }),
            None => Ok(()),
        }
    }

    /// Check if the color parameters leave every pixel unchanged
    pub fn is_identity_color(&self) -> bool {
        self.normalized_hue_degrees().abs() < 1e-4
            && (self.saturation_factor - 1.0).abs() < f32::EPSILON
            && self.brightness_offset.abs() < f32::EPSILON
    }
}
