//! Geometry helpers for drawing crop overlays in the page.

use chairside_core::compute_rotated_bounds as core_bounds;
use wasm_bindgen::prelude::*;

/// Size of the canvas that holds a `width` x `height` image rotated
/// clockwise by `angle_degrees`, as `[width, height]`.
///
/// ```typescript
/// const [w, h] = compute_rotated_bounds(200, 100, 90); // [100, 200]
/// ```
#[wasm_bindgen]
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> Vec<u32> {
    let (w, h) = core_bounds(width, height, angle_degrees);
    vec![w, h]
}
