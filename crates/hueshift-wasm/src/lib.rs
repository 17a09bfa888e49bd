//! HueShift WASM - WebAssembly bindings for the HueShift pipeline
//!
//! This crate exposes hueshift-core to the JavaScript host, which owns the
//! picker, the editing view and the photo library.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (JPEG/PNG with EXIF orientation)
//! - `transform` - Geometry compositor, full render and live preview
//! - `adjustments` - Transform parameters and the color stage
//! - `encode` - Image encoding bindings (JPEG and PNG export)
//! - `console` - Routes core log records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, render, encode_jpeg, TransformParameters } from '@hueshift/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const params = new TransformParameters();
//! params.hue = 90;
//! const jpeg = encode_jpeg(render(image, params, true), 100);
//! ```

use wasm_bindgen::prelude::*;

mod adjustments;
mod console;
mod decode;
mod encode;
mod transform;
mod types;

// Re-export public types
pub use adjustments::{apply_color, TransformParameters};
pub use decode::{decode_image, exif_orientation};
pub use encode::{encode_jpeg, encode_png};
pub use transform::{canvas_size, compose, render, render_preview};
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console::install(log::LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
