//! Image encoding WASM bindings.
//!
//! The host saves the returned bytes to the photo library itself; these
//! functions only produce the file contents.
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg } from '@hueshift/wasm';
//!
//! const jpeg = encode_jpeg(finished, 100);
//! await library.save(new Blob([jpeg], { type: 'image/jpeg' }));
//! ```

use crate::types::{to_js_error, JsRasterImage};
use hueshift_core::encode;
use wasm_bindgen::prelude::*;

/// Encode an image to JPEG bytes.
///
/// Transparent pixels are flattened over black.
///
/// # Arguments
///
/// * `image` - The image to encode
/// * `quality` - JPEG quality (1-100, 100 is what the export flow uses)
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsRasterImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(image.raster(), quality).map_err(to_js_error)
}

/// Encode an image to lossless PNG bytes, keeping alpha.
#[wasm_bindgen]
pub fn encode_png(image: &JsRasterImage) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(image.raster()).map_err(to_js_error)
}
