//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@hueshift/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{to_js_error, JsRasterImage};
use hueshift_core::decode;
use wasm_bindgen::prelude::*;

/// Decode a JPEG or PNG file into an upright RGBA image.
///
/// EXIF orientation is applied, so the result is what the user expects to see.
///
/// # Errors
///
/// Returns an error if the format is not recognized, the file is corrupted,
/// or it decodes to zero pixels.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(to_js_error)
}

/// Read the EXIF orientation tag (1-8) from a file, or 1 when absent.
#[wasm_bindgen]
pub fn exif_orientation(bytes: &[u8]) -> u8 {
    use decode::Orientation;

    match decode::get_orientation(bytes) {
        Orientation::Normal => 1,
        Orientation::FlipHorizontal => 2,
        Orientation::Rotate180 => 3,
        Orientation::FlipVertical => 4,
        Orientation::Transpose => 5,
        Orientation::Rotate90CW => 6,
        Orientation::Transverse => 7,
        Orientation::Rotate270CW => 8,
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use hueshift_core::{encode::encode_png, RasterImage};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_decode_png() {
        let png = encode_png(&RasterImage::filled(6, 4, [10, 20, 30, 255])).unwrap();
        let image = decode_image(&png).unwrap();
        assert_eq!((image.width(), image.height()), (6, 4));
    }

    #[wasm_bindgen_test]
    fn test_decode_garbage_fails() {
        assert!(decode_image(&[1, 2, 3, 4]).is_err());
    }
}
