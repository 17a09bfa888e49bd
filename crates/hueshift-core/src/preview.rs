//! Live preview rendering.
//!
//! While sliders move, the host needs a fast, small rendering of the color
//! controls. The preview fits the source within `max_edge` using the `image`
//! crate's resampling and then runs the same color stage as export, so the
//! colors match the exported file. Rotation is not previewed.

use crate::adjustments::apply_color;
use crate::pipeline::PipelineError;
use crate::raster::RasterImage;
use crate::transform::{output_canvas_size, InterpolationFilter};
use crate::TransformParameters;

/// Render a downsized preview of `source` with the color parameters applied.
///
/// # Arguments
///
/// * `source` - Upright source raster
/// * `params` - Current slider values
/// * `max_edge` - Longest edge of the preview in pixels
/// * `filter` - Resampling filter for the downsize
///
/// # Errors
///
/// * `PipelineError::InvalidSource` for an empty source or a zero `max_edge`
/// * `PipelineError::InvalidParameters` when a parameter is NaN or infinite
pub fn render_preview(
    source: &RasterImage,
    params: &TransformParameters,
    max_edge: u32,
    filter: InterpolationFilter,
) -> Result<RasterImage, PipelineError> {
    if source.is_empty() {
        return Err(PipelineError::InvalidSource(format!(
            "source is {}x{}",
            source.width(),
            source.height()
        )));
    }
    if max_edge == 0 {
        return Err(PipelineError::InvalidSource(
            "preview edge must be non-zero".to_string(),
        ));
    }
    params.validate()?;

    let fitted = fit_within(source, max_edge, filter)?;
    Ok(apply_color(&fitted, params)?)
}

fn fit_within(
    source: &RasterImage,
    max_edge: u32,
    filter: InterpolationFilter,
) -> Result<RasterImage, PipelineError> {
    let (width, height, ratio) = output_canvas_size(source.width(), source.height(), max_edge);

    // If already fits, just clone
    if ratio >= 1.0 {
        return Ok(source.clone());
    }

    let rgba = source.to_rgba_image().ok_or_else(|| {
        PipelineError::InvalidSource("pixel buffer does not match dimensions".to_string())
    })?;
    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(RasterImage::from_rgba_image(resized))
}
