//! Transform parameter and color stage WASM bindings.
//!
//! This module provides JavaScript bindings for the TransformParameters type,
//! so slider values can be kept on the Rust side and handed to the pipeline.

use crate::types::{to_js_error, JsRasterImage};
use wasm_bindgen::prelude::*;

/// Transform parameters wrapper for JavaScript
#[wasm_bindgen]
pub struct TransformParameters {
    inner: hueshift_core::TransformParameters,
}

#[wasm_bindgen]
impl TransformParameters {
    /// Create parameters with neutral color values and no rotation
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: hueshift_core::TransformParameters::new(),
        }
    }

    /// Get hue rotation in degrees
    #[wasm_bindgen(getter)]
    pub fn hue(&self) -> f32 {
        self.inner.hue_degrees
    }

    /// Set hue rotation in degrees
    #[wasm_bindgen(setter)]
    pub fn set_hue(&mut self, value: f32) {
        self.inner.hue_degrees = value;
    }

    /// Get saturation multiplier
    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation_factor
    }

    /// Set saturation multiplier
    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f32) {
        self.inner.saturation_factor = value;
    }

    /// Get brightness offset
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness_offset
    }

    /// Set brightness offset
    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f32) {
        self.inner.brightness_offset = value;
    }

    /// Get clockwise rotation in degrees
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.inner.rotation_degrees
    }

    /// Set clockwise rotation in degrees
    #[wasm_bindgen(setter)]
    pub fn set_rotation(&mut self, value: f64) {
        self.inner.rotation_degrees = value;
    }

    /// Get the longest edge allowed on the output canvas
    #[wasm_bindgen(getter = maxOutputDimension)]
    pub fn max_output_dimension(&self) -> u32 {
        self.inner.max_output_dimension
    }

    /// Set the longest edge allowed on the output canvas
    #[wasm_bindgen(setter = maxOutputDimension)]
    pub fn set_max_output_dimension(&mut self, value: u32) {
        self.inner.max_output_dimension = value;
    }

    /// Check if the color values leave every pixel unchanged
    pub fn is_identity_color(&self) -> bool {
        self.inner.is_identity_color()
    }

    /// Serialize to a plain JS object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a plain JS object; missing fields take their defaults
    pub fn from_json(value: JsValue) -> Result<TransformParameters, JsValue> {
        let inner: hueshift_core::TransformParameters =
            serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self { inner })
    }
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformParameters {
    pub(crate) fn inner(&self) -> &hueshift_core::TransformParameters {
        &self.inner
    }
}

/// Apply hue, saturation and brightness to an image.
///
/// Returns a new image; the source is left untouched.
///
/// # Example (TypeScript)
/// ```typescript
/// const params = new TransformParameters();
/// params.hue = 180;
/// const tinted = apply_color(sourceImage, params);
/// ```
#[wasm_bindgen]
pub fn apply_color(
    image: &JsRasterImage,
    params: &TransformParameters,
) -> Result<JsRasterImage, JsValue> {
    hueshift_core::apply_color(image.raster(), params.inner())
        .map(JsRasterImage::from_raster)
        .map_err(to_js_error)
}
