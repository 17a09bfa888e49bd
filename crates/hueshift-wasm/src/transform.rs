//! WASM bindings for the geometry compositor and the full render.

use crate::adjustments::TransformParameters;
use crate::types::{to_js_error, JsRasterImage};
use hueshift_core::transform::{compose as core_compose, output_canvas_size};
use hueshift_core::{preview, InterpolationFilter, Pipeline, PipelineConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn filter(use_lanczos: bool) -> InterpolationFilter {
    if use_lanczos {
        InterpolationFilter::Lanczos3
    } else {
        InterpolationFilter::Bilinear
    }
}

/// Size of the composed canvas, as reported to JavaScript.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CanvasSize {
    width: u32,
    height: u32,
    scale: f64,
}

/// Compute the canvas the compositor would produce for a source size.
///
/// Returns `{ width, height, scale }`.
#[wasm_bindgen]
pub fn canvas_size(width: u32, height: u32, max_dimension: u32) -> Result<JsValue, JsValue> {
    let (width, height, scale) = output_canvas_size(width, height, max_dimension);
    serde_wasm_bindgen::to_value(&CanvasSize {
        width,
        height,
        scale,
    })
    .map_err(to_js_error)
}

/// Rotate an image about its center and fit it within `max_dimension`.
///
/// The canvas keeps the source's aspect ratio and does not grow to fit the
/// rotated corners; uncovered pixels are transparent.
///
/// # Arguments
///
/// * `image` - Source image
/// * `rotation_degrees` - Clockwise rotation in degrees
/// * `max_dimension` - Longest edge allowed on either axis
/// * `use_lanczos` - Use high-quality Lanczos3 filter (slower), otherwise bilinear
#[wasm_bindgen]
pub fn compose(
    image: &JsRasterImage,
    rotation_degrees: f64,
    max_dimension: u32,
    use_lanczos: bool,
) -> Result<JsRasterImage, JsValue> {
    core_compose(
        image.raster(),
        rotation_degrees,
        max_dimension,
        filter(use_lanczos),
    )
    .map(JsRasterImage::from_raster)
    .map_err(to_js_error)
}

/// Run the compositor and the color stage: the image that would be exported.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const params = new TransformParameters();
/// params.hue = 45;
/// params.rotation = 90;
/// const finished = render(sourceImage, params, true);
/// const jpeg = encode_jpeg(finished, 100);
/// ```
#[wasm_bindgen]
pub fn render(
    image: &JsRasterImage,
    params: &TransformParameters,
    use_lanczos: bool,
) -> Result<JsRasterImage, JsValue> {
    let pipeline = Pipeline::with_config(PipelineConfig {
        interpolation: filter(use_lanczos),
        ..PipelineConfig::default()
    });
    pipeline
        .render(image.raster(), params.inner())
        .map(JsRasterImage::from_raster)
        .map_err(to_js_error)
}

/// Render a small color-only preview for the live editing view.
#[wasm_bindgen]
pub fn render_preview(
    image: &JsRasterImage,
    params: &TransformParameters,
    max_edge: u32,
) -> Result<JsRasterImage, JsValue> {
    preview::render_preview(
        image.raster(),
        params.inner(),
        max_edge,
        InterpolationFilter::Bilinear,
    )
    .map(JsRasterImage::from_raster)
    .map_err(to_js_error)
}
