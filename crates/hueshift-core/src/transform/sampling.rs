//! Source sampling for the geometry compositor.
//!
//! Coordinates passed in are continuous source coordinates in pixel-index
//! space: `(0.0, 0.0)` is the center of the top-left pixel. Callers are
//! responsible for coverage tests; samplers clamp neighbours to the edge.
//!
//! Interpolation runs on premultiplied color so that transparent neighbours
//! do not bleed their (meaningless) RGB into semi-transparent edges.

use serde::{Deserialize, Serialize};

use crate::raster::{RasterImage, CHANNELS};

/// Interpolation filter used when rasterizing the source onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation - good for preview rendering.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation - good for export.
    Lanczos3,
}

impl InterpolationFilter {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            InterpolationFilter::Bilinear => image::imageops::FilterType::Triangle,
            InterpolationFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Get a pixel as premultiplied [f64; 4] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &RasterImage, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * image.width() as usize + px) * CHANNELS;
    let p = &image.pixels()[idx..idx + CHANNELS];
    let a = p[3] as f64;
    let k = a / 255.0;
    [p[0] as f64 * k, p[1] as f64 * k, p[2] as f64 * k, a]
}

/// Turn a weighted premultiplied sum back into a straight-alpha pixel.
#[inline]
fn unpremultiply(sum: [f64; 4], weight_sum: f64) -> [u8; 4] {
    let alpha = (sum[3] / weight_sum).clamp(0.0, 255.0).round() as u8;
    if alpha == 0 {
        return [0; 4];
    }

    let mut result = [0, 0, 0, alpha];
    for i in 0..3 {
        result[i] = (sum[i] / sum[3] * 255.0).clamp(0.0, 255.0).round() as u8;
    }
    result
}

/// Sample a pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance.
pub(crate) fn sample_bilinear(image: &RasterImage, x: f64, y: f64) -> [u8; 4] {
    let max_x = (image.width() - 1) as f64;
    let max_y = (image.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width() as usize - 1);
    let y1 = (y0 + 1).min(image.height() as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut sum = [0.0f64; 4];
    for i in 0..CHANNELS {
        sum[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }

    unpremultiply(sum, 1.0)
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// `scale` is the canvas-to-source scale ratio. When downscaling
/// (`scale < 1`) the kernel is widened by `1 / scale` so that every source
/// pixel under the footprint contributes.
pub(crate) fn sample_lanczos3(image: &RasterImage, x: f64, y: f64, scale: f64) -> [u8; 4] {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let stretch = if scale < 1.0 { 1.0 / scale } else { 1.0 };
    let support = 3.0 * stretch;

    let x_start = (x - support).floor() as i64 + 1;
    let x_end = (x + support).floor() as i64;
    let y_start = (y - support).floor() as i64 + 1;
    let y_end = (y + support).floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for py in y_start..=y_end {
        let wy = lanczos_weight((y - py as f64) / stretch, 3.0);
        if wy == 0.0 {
            continue;
        }
        let sy = py.clamp(0, h - 1) as usize;
        for px in x_start..=x_end {
            let wx = lanczos_weight((x - px as f64) / stretch, 3.0);
            if wx == 0.0 {
                continue;
            }
            let sx = px.clamp(0, w - 1) as usize;
            let weight = wx * wy;
            let pixel = get_pixel_f64(image, sx, sy);
            for i in 0..CHANNELS {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return sample_bilinear(image, x, y);
    }

    unpremultiply(sum, weight_sum)
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}
