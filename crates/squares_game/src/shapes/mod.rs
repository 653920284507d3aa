//! Shape catalog and rotation engine.
//!
//! Shapes are process-wide constants. Every `(shape, orientation)` pair is
//! transformed once on first use and served by reference afterwards.

mod catalog;
mod orientation;

pub use catalog::{Shape, catalog_shape, shape};
pub use orientation::{
    NUM_ORIENTATIONS, Orientation, OrientationMask, available_orientations, next_orientation,
    prev_orientation,
};
