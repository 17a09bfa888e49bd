//! Color transform stage.
//!
//! Applies the three color controls to RGBA pixel data.
//!
//! ## Adjustment Order
//! 1. Hue rotation (HSL hue channel)
//! 2. Saturation (chroma scaling around Rec.709 luminance)
//! 3. Brightness (offset added to every channel)
//!
//! The order is fixed: saturation and brightness operate on the hue-shifted
//! values. All math runs in floating point and is quantized once at the end,
//! after clamping to the displayable range.

use palette::{Hsl, IntoColor, Srgb};
use rayon::prelude::*;
use thiserror::Error;

use crate::luminance::calculate_luminance;
use crate::raster::{RasterImage, CHANNELS};
use crate::{ParameterError, TransformParameters};

/// Pixel count above which the stage fans out across rayon workers.
pub const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Errors raised by the color stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    /// The input had no pixels, so there is nothing to hand to export
    #[error("Color transform produced an empty result ({width}x{height} input)")]
    EmptyResult { width: u32, height: u32 },

    #[error(transparent)]
    InvalidParameters(#[from] ParameterError),
}

/// Resolved color controls for one invocation.
#[derive(Debug, Clone, Copy)]
struct ColorOps {
    hue_degrees: f32,
    saturation: f32,
    brightness: f32,
}

impl ColorOps {
    fn from_params(params: &TransformParameters) -> Self {
        Self {
            hue_degrees: params.normalized_hue_degrees(),
            saturation: params.saturation_factor,
            brightness: params.brightness_offset,
        }
    }

    #[inline]
    fn apply(&self, r: f32, g: f32, b: f32) -> (f32, f32, f32) {
        let (r, g, b) = rotate_hue(r, g, b, self.hue_degrees);
        let (r, g, b) = scale_saturation(r, g, b, self.saturation);
        offset_brightness(r, g, b, self.brightness)
    }
}

/// Apply hue, saturation and brightness to a raster.
///
/// # Arguments
/// * `raster` - Composed RGBA raster
/// * `params` - Color parameters (geometry fields are ignored here)
///
/// # Errors
/// * `ColorError::InvalidParameters` when a parameter is NaN or infinite
/// * `ColorError::EmptyResult` for a zero-sized raster instead of emitting a
///   blank image
pub fn apply_color(
    raster: &RasterImage,
    params: &TransformParameters,
) -> Result<RasterImage, ColorError> {
    params.validate()?;
    if raster.is_empty() {
        return Err(ColorError::EmptyResult {
            width: raster.width(),
            height: raster.height(),
        });
    }

    // Early exit if no adjustments
    if params.is_identity_color() {
        return Ok(raster.clone());
    }

    let ops = ColorOps::from_params(params);
    let mut pixels = raster.pixels().to_vec();

    if raster.pixel_count() >= PARALLEL_THRESHOLD {
        pixels
            .par_chunks_exact_mut(CHANNELS)
            .for_each(|px| adjust_pixel(px, &ops));
    } else {
        pixels
            .chunks_exact_mut(CHANNELS)
            .for_each(|px| adjust_pixel(px, &ops));
    }

    log::debug!(
        "apply_color: {}x{} hue={} sat={} bright={}",
        raster.width(),
        raster.height(),
        ops.hue_degrees,
        ops.saturation,
        ops.brightness
    );

    Ok(RasterImage::from_parts(
        raster.width(),
        raster.height(),
        pixels,
    ))
}

#[inline]
fn adjust_pixel(px: &mut [u8], ops: &ColorOps) {
    if px[3] == 0 {
        return; // Skip fully transparent pixels
    }

    let r = px[0] as f32 / 255.0;
    let g = px[1] as f32 / 255.0;
    let b = px[2] as f32 / 255.0;

    let (r, g, b) = ops.apply(r, g, b);

    px[0] = quantize(r);
    px[1] = quantize(g);
    px[2] = quantize(b);
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rotate the hue of a normalized RGB color.
///
/// The color is converted to HSL, `degrees` is added to the hue angle and
/// the result converted back. Saturation and lightness are untouched.
#[inline]
pub fn rotate_hue(r: f32, g: f32, b: f32, degrees: f32) -> (f32, f32, f32) {
    if degrees == 0.0 {
        return (r, g, b);
    }
    let mut hsl: Hsl = Srgb::new(r, g, b).into_color();
    hsl.hue += degrees;
    let rotated: Srgb = hsl.into_color();
    (rotated.red, rotated.green, rotated.blue)
}

/// Scale chroma around the pixel's luminance.
///
/// 0 yields grayscale, 1 is identity, values above 1 oversaturate.
///
/// Formula: `output = gray + (input - gray) * factor`
#[inline]
pub fn scale_saturation(r: f32, g: f32, b: f32, factor: f32) -> (f32, f32, f32) {
    if factor == 1.0 {
        return (r, g, b);
    }
    let gray = calculate_luminance(r, g, b);
    (
        gray + (r - gray) * factor,
        gray + (g - gray) * factor,
        gray + (b - gray) * factor,
    )
}

/// Add a brightness offset to every channel.
///
/// Formula: `output = input + offset`
#[inline]
pub fn offset_brightness(r: f32, g: f32, b: f32, offset: f32) -> (f32, f32, f32) {
    (r + offset, g + offset, b + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> RasterImage {
        RasterImage::filled(4, 4, [r, g, b, 255])
    }

    fn first_pixel(img: &RasterImage) -> [u8; 4] {
        img.pixel(0, 0).unwrap()
    }

    fn apply(img: &RasterImage, hue: f32, sat: f32, bright: f32) -> RasterImage {
        apply_color(img, &TransformParameters::with_color(hue, sat, bright)).unwrap()
    }

    // ===== Identity Tests =====

    #[test]
    fn test_identity_parameters() {
        let img = solid(128, 64, 192);
        assert_eq!(apply(&img, 0.0, 1.0, 0.0), img);
    }

    #[test]
    fn test_full_turn_is_identity() {
        let img = solid(12, 200, 99);
        assert_eq!(apply(&img, 360.0, 1.0, 0.0), img);
        assert_eq!(apply(&img, -360.0, 1.0, 0.0), img);
    }

    // ===== Hue Tests =====

    #[test]
    fn test_red_rotated_180_is_cyan() {
        let img = RasterImage::filled(100, 100, [255, 0, 0, 255]);
        let result = apply(&img, 180.0, 1.0, 0.0);

        assert_eq!(result.width(), 100);
        assert_eq!(result.height(), 100);
        for chunk in result.pixels().chunks_exact(4) {
            assert_eq!(chunk, &[0, 255, 255, 255]);
        }
    }

    #[test]
    fn test_hue_120_cycles_primaries() {
        assert_eq!(first_pixel(&apply(&solid(255, 0, 0), 120.0, 1.0, 0.0)), [0, 255, 0, 255]);
        assert_eq!(first_pixel(&apply(&solid(0, 255, 0), 120.0, 1.0, 0.0)), [0, 0, 255, 255]);
        assert_eq!(first_pixel(&apply(&solid(0, 0, 255), -120.0, 1.0, 0.0)), [0, 255, 0, 255]);
    }

    #[test]
    fn test_hue_180_twice_is_identity() {
        let img = solid(200, 128, 100);
        let once = apply(&img, 180.0, 1.0, 0.0);
        assert_ne!(once, img);
        let twice = apply(&once, 180.0, 1.0, 0.0);
        assert_eq!(twice, img);
    }

    #[test]
    fn test_hue_leaves_gray_alone() {
        let img = solid(77, 77, 77);
        assert_eq!(apply(&img, 90.0, 1.0, 0.0), img);
    }

    #[test]
    fn test_rotate_hue_zero_is_noop() {
        assert_eq!(rotate_hue(0.1, 0.2, 0.3, 0.0), (0.1, 0.2, 0.3));
    }

    // ===== Saturation Tests =====

    #[test]
    fn test_saturation_zero_is_grayscale() {
        let result = apply(&solid(200, 128, 100), 0.0, 0.0, 0.0);
        let [r, g, b, a] = first_pixel(&result);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_saturation_increase() {
        let result = apply(&solid(200, 128, 100), 0.0, 1.5, 0.0);
        let [r, _, b, _] = first_pixel(&result);
        assert!(
            (r as i32 - b as i32) > 100,
            "Color difference should increase"
        );
    }

    #[test]
    fn test_oversaturation_clamps() {
        let result = apply(&solid(255, 0, 0), 0.0, 2.0, 0.0);
        assert_eq!(first_pixel(&result), [255, 0, 0, 255]);
    }

    // ===== Brightness Tests =====

    #[test]
    fn test_brightness_adds_offset() {
        let result = apply(&solid(0, 0, 0), 0.0, 1.0, 0.2);
        // 0.2 * 255 = 51
        assert_eq!(first_pixel(&result), [51, 51, 51, 255]);
    }

    #[test]
    fn test_brightness_clamps_at_white() {
        let result = apply(&solid(200, 10, 100), 0.0, 1.0, 2.0);
        assert_eq!(first_pixel(&result), [255, 255, 255, 255]);
    }

    #[test]
    fn test_negative_brightness_clamps_at_black() {
        let result = apply(&solid(200, 10, 100), 0.0, 1.0, -2.0);
        assert_eq!(first_pixel(&result), [0, 0, 0, 255]);
    }

    // ===== Ordering Tests =====

    #[test]
    fn test_saturation_runs_after_hue() {
        // Red -> green (hue first), then grayscale of green = 0.7152 * 255
        let result = apply(&solid(255, 0, 0), 120.0, 0.0, 0.0);
        assert_eq!(first_pixel(&result), [182, 182, 182, 255]);
    }

    // ===== Alpha Tests =====

    #[test]
    fn test_alpha_preserved() {
        let img = RasterImage::filled(2, 2, [255, 0, 0, 128]);
        let result = apply(&img, 180.0, 1.0, 0.0);
        assert_eq!(first_pixel(&result), [0, 255, 255, 128]);
    }

    #[test]
    fn test_transparent_pixels_untouched() {
        let img = RasterImage::filled(2, 2, [0, 0, 0, 0]);
        let result = apply(&img, 45.0, 2.0, 1.0);
        assert_eq!(result, img);
    }

    // ===== Edge Case Tests =====

    #[test]
    fn test_non_finite_parameters_rejected() {
        let img = solid(200, 100, 50);
        let result = apply_color(&img, &TransformParameters::with_color(0.0, f32::NAN, 0.0));
        assert_eq!(
            result,
            Err(ColorError::InvalidParameters(ParameterError::NonFinite {
                field: "saturationFactor"
            }))
        );

        let result = apply_color(
            &img,
            &TransformParameters::with_color(f32::INFINITY, 1.0, 0.0),
        );
        assert!(matches!(result, Err(ColorError::InvalidParameters(_))));
    }

    #[test]
    fn test_empty_raster_fails() {
        let img = RasterImage::new(0, 0, vec![]).unwrap();
        let result = apply_color(&img, &TransformParameters::new());
        assert_eq!(
            result,
            Err(ColorError::EmptyResult {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        // Same pixel pattern, one image below and one above the threshold
        let pattern: Vec<u8> = (0..256u32)
            .flat_map(|i| [(i * 3) as u8, (i * 7) as u8, (i * 13) as u8, 255])
            .collect();
        let small = RasterImage::new(16, 16, pattern.clone()).unwrap();

        let rows = (PARALLEL_THRESHOLD / 256 + 1) as u32;
        let big_pixels: Vec<u8> = pattern
            .iter()
            .copied()
            .cycle()
            .take(256 * rows as usize * 4)
            .collect();
        let big = RasterImage::new(256, rows, big_pixels).unwrap();
        assert!(big.pixel_count() >= PARALLEL_THRESHOLD);

        let params = TransformParameters::with_color(-37.0, 1.3, 0.05);
        let small_out = apply_color(&small, &params).unwrap();
        let big_out = apply_color(&big, &params).unwrap();

        assert_eq!(&big_out.pixels()[..small_out.byte_size()], small_out.pixels());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
