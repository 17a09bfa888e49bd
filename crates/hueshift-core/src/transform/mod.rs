//! Geometry stage: rotation and scaling onto a bounded canvas.
//!
//! This stage runs first, on the untransformed source, because rotation and
//! scale are defined relative to the original pixel coordinates.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - Rotation angles are in degrees, positive = clockwise
//! - Rotation and scale are applied about the canvas center

mod compose;
mod sampling;

pub use compose::{compose, output_canvas_size, ComposeError};
pub use sampling::InterpolationFilter;
