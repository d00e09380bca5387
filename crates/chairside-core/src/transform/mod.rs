//! Rotation, flip and crop of a source image into the output frame.
//!
//! # Pipeline
//!
//! 1. The geometry calculator sizes an intermediate surface to the rotated
//!    bounding box.
//! 2. The source is drawn into it, rotated and flipped about its own center,
//!    on an opaque white background.
//! 3. The crop rectangle is copied into an output surface of exactly the
//!    crop size, and the intermediate surface is released.
//!
//! # Coordinate System
//!
//! - Angles are in degrees, positive = clockwise on screen
//! - Crop rectangles are in pixels of the rotated bounding box
//! - Origin is top-left corner

mod compositor;
mod geometry;
mod surface;

pub use compositor::{render, render_with, RenderError, RenderOptions};
pub use geometry::{
    compute_rotated_bounds, normalize_degrees, quarter_turns, CropRect, Transform,
};
pub use surface::{InterpolationFilter, Surface, SurfaceLimits};
