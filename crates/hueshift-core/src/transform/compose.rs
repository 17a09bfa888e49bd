//! Geometry compositor: bounded canvas, centered rotation, uniform downscale.
//!
//! # Algorithm
//!
//! The forward transform applied to the source is
//!
//! ```text
//! translate(canvas_center) * scale(r) * rotate(theta) * translate(-source_size / 2)
//! ```
//!
//! Rasterization uses inverse mapping: for each canvas pixel center we undo
//! the transform and sample the source there.
//!
//! ```text
//! src_x = ( dx * cos(theta) + dy * sin(theta)) / r + src_w / 2
//! src_y = (-dx * sin(theta) + dy * cos(theta)) / r + src_h / 2
//! ```
//!
//! `theta` is clockwise-positive because the raster frame has y pointing down.

use rayon::prelude::*;
use thiserror::Error;

use super::sampling::{sample_bilinear, sample_lanczos3, InterpolationFilter};
use crate::raster::{RasterImage, CHANNELS};

/// Errors raised by the geometry compositor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// Source has no pixels to draw
    #[error("Source image is empty ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    /// Maximum output dimension of zero leaves no room for a canvas
    #[error("Maximum output dimension must be non-zero")]
    ZeroMaxDimension,

    /// Rotation angle is NaN or infinite
    #[error("Rotation angle must be a finite number")]
    NonFiniteRotation,

    /// The canvas buffer could not be allocated
    #[error("Failed to allocate {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },
}

/// Compute the composed canvas size and the uniform scale ratio.
///
/// Each axis is first bounded by `max_dimension`; the smaller of the two
/// per-axis ratios is then applied to both axes, so the canvas keeps the
/// source's aspect ratio and never exceeds `max_dimension` on either axis.
///
/// # Returns
///
/// Tuple of (canvas_width, canvas_height, scale_ratio).
pub fn output_canvas_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32, f64) {
    let bounded_w = width.min(max_dimension) as f64;
    let bounded_h = height.min(max_dimension) as f64;

    let ratio = (bounded_w / width as f64).min(bounded_h / height as f64);

    let canvas_w = ((width as f64 * ratio).round() as u32).clamp(1, max_dimension);
    let canvas_h = ((height as f64 * ratio).round() as u32).clamp(1, max_dimension);

    (canvas_w, canvas_h, ratio)
}

/// Rasterize `source` onto a bounded canvas with centered rotation and scale.
///
/// # Arguments
///
/// * `source` - Untransformed source raster
/// * `rotation_degrees` - Clockwise rotation in degrees (any real value)
/// * `max_dimension` - Longest edge allowed on either canvas axis
/// * `filter` - Interpolation used to sample the source
///
/// # Returns
///
/// A new raster. Canvas pixels that fall outside the rotated source are
/// fully transparent; the canvas does not grow to fit rotated corners.
///
/// # Errors
///
/// * `ComposeError::EmptySource` for a zero-sized source
/// * `ComposeError::ZeroMaxDimension` when `max_dimension == 0`
/// * `ComposeError::NonFiniteRotation` for a NaN or infinite angle
/// * `ComposeError::Allocation` if the canvas buffer cannot be allocated
pub fn compose(
    source: &RasterImage,
    rotation_degrees: f64,
    max_dimension: u32,
    filter: InterpolationFilter,
) -> Result<RasterImage, ComposeError> {
    if source.is_empty() {
        return Err(ComposeError::EmptySource {
            width: source.width(),
            height: source.height(),
        });
    }
    if max_dimension == 0 {
        return Err(ComposeError::ZeroMaxDimension);
    }
    if !rotation_degrees.is_finite() {
        return Err(ComposeError::NonFiniteRotation);
    }

    let (dst_w, dst_h, ratio) = output_canvas_size(source.width(), source.height(), max_dimension);

    // Fast path: nothing to scale or rotate
    if ratio >= 1.0 && is_full_turn(rotation_degrees) {
        log::debug!(
            "compose: {}x{} passthrough",
            source.width(),
            source.height()
        );
        return Ok(source.clone());
    }

    let mut output = allocate_canvas(dst_w, dst_h)?;

    // Reduce first so huge angles keep their precision
    let angle_rad = rotation_degrees.rem_euclid(360.0).to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let src_w = source.width() as f64;
    let src_h = source.height() as f64;
    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let row_len = dst_w as usize * CHANNELS;

    output
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(dst_y, row)| {
            let dy = dst_y as f64 + 0.5 - dst_cy;
            for (dst_x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let dx = dst_x as f64 + 0.5 - dst_cx;

                // Source position in continuous coordinates (pixel edges at integers)
                let sx = (dx * cos + dy * sin) / ratio + src_cx;
                let sy = (-dx * sin + dy * cos) / ratio + src_cy;

                if sx < 0.0 || sx >= src_w || sy < 0.0 || sy >= src_h {
                    // Outside the source: leave transparent
                    continue;
                }

                // Shift to pixel-index space where pixel centers sit on integers
                let (ux, uy) = (sx - 0.5, sy - 0.5);
                let pixel = match filter {
                    InterpolationFilter::Bilinear => sample_bilinear(source, ux, uy),
                    InterpolationFilter::Lanczos3 => sample_lanczos3(source, ux, uy, ratio),
                };
                out.copy_from_slice(&pixel);
            }
        });

    log::debug!(
        "compose: {}x{} -> {}x{} (scale {:.4}, rotation {} deg, {:?})",
        source.width(),
        source.height(),
        dst_w,
        dst_h,
        ratio,
        rotation_degrees,
        filter
    );

    Ok(RasterImage::from_parts(dst_w, dst_h, output))
}

/// True when the angle is a whole number of turns (within tolerance).
fn is_full_turn(angle_degrees: f64) -> bool {
    let normalized = angle_degrees.rem_euclid(360.0);
    normalized < 0.001 || 360.0 - normalized < 0.001
}

/// Allocate a zeroed (fully transparent) canvas buffer without aborting on failure.
fn allocate_canvas(width: u32, height: u32) -> Result<Vec<u8>, ComposeError> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(ComposeError::Allocation { width, height })?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| ComposeError::Allocation { width, height })?;
    buffer.resize(len, 0);
    Ok(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
