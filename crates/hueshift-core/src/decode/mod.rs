//! Source decoding for HueShift.
//!
//! The pipeline itself only needs decoded pixels. This module turns the
//! encoded bytes a picker hands over (JPEG or PNG) into an upright RGBA
//! [`RasterImage`](crate::raster::RasterImage), applying the EXIF
//! orientation so that rotation parameters refer to what the user sees.

mod source;
mod types;

pub use source::{decode_image, get_orientation};
pub use types::{DecodeError, Orientation};
