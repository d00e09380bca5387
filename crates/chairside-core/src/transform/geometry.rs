//! Rotation geometry: bounding boxes, crop rectangles and the inverse
//! mapping the compositor samples through.
//!
//! Angles are in degrees. Positive angles rotate clockwise on screen, the
//! same direction a canvas `rotate()` call turns a y-down coordinate system.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Values this close to an integer are treated as that integer before
/// rounding up, so `cos(90°) ≈ 6e-17` never adds a phantom pixel.
const SNAP_EPSILON: f64 = 1e-6;

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(angle_degrees: f64) -> f64 {
    let a = angle_degrees.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// How many clockwise quarter turns (0-3) an angle is, or `None` if it is
/// not a multiple of 90°.
pub fn quarter_turns(angle_degrees: f64) -> Option<u32> {
    let turns = normalize_degrees(angle_degrees) / 90.0;
    let nearest = turns.round();
    if (turns - nearest).abs() > 1e-9 {
        return None;
    }
    Some(nearest as u32 % 4)
}

/// Exact `(cos, sin)` for quarter turns, `None` otherwise.
fn quarter_turn(angle_degrees: f64) -> Option<(f64, f64)> {
    quarter_turns(angle_degrees).map(|turns| match turns {
        0 => (1.0, 0.0),
        1 => (0.0, 1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    })
}

fn cos_sin(angle_degrees: f64) -> (f64, f64) {
    quarter_turn(angle_degrees).unwrap_or_else(|| {
        let rad = angle_degrees.to_radians();
        (rad.cos(), rad.sin())
    })
}

fn snap_ceil(v: f64) -> u32 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON {
        r as u32
    } else {
        v.ceil() as u32
    }
}

/// Compute the smallest axis-aligned box containing a `width x height`
/// image after rotating it about its center.
///
/// `bw = |cos θ|·w + |sin θ|·h`, `bh = |sin θ|·w + |cos θ|·h`, each rounded
/// up to a whole pixel. Quarter turns are exact: 0° and 180° keep the
/// dimensions, 90° and 270° swap them.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let (cos, sin) = cos_sin(angle_degrees);
    let (cos, sin) = (cos.abs(), sin.abs());
    let (w, h) = (width as f64, height as f64);

    (snap_ceil(cos * w + sin * h), snap_ceil(sin * w + cos * h))
}

/// A pixel-space rectangle in post-transform coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle covering a whole `width x height` frame.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge, widened so huge values cannot overflow.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether the rectangle lies entirely inside a `width x height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Shrink and shift the rectangle so it lies inside the frame.
    ///
    /// Size is reduced first (never below 1x1), then the origin is pulled
    /// back so the far edges stay in bounds. A zero-sized frame yields an
    /// empty rectangle.
    pub fn clamped_to(&self, width: u32, height: u32) -> CropRect {
        if width == 0 || height == 0 {
            return CropRect::default();
        }
        let w = self.width.clamp(1, width);
        let h = self.height.clamp(1, height);
        CropRect {
            x: self.x.min(width - w),
            y: self.y.min(height - h),
            width: w,
            height: h,
        }
    }

    /// A rectangle of the given size centered on this one's center, then
    /// clamped into the frame.
    pub fn resized_about_center(
        &self,
        new_width: u32,
        new_height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> CropRect {
        let cx = self.x as f64 + self.width as f64 / 2.0;
        let cy = self.y as f64 + self.height as f64 / 2.0;
        let x = (cx - new_width as f64 / 2.0).round().max(0.0) as u32;
        let y = (cy - new_height as f64 / 2.0).round().max(0.0) as u32;
        CropRect::new(x, y, new_width, new_height).clamped_to(frame_width, frame_height)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

/// The rotate-then-flip transform about the image center, placed in the
/// middle of its rotated bounding box.
///
/// Forward mapping (what a canvas does): translate to the box center, rotate,
/// scale by the flip factors, translate back by half the source size. The
/// compositor walks destination pixels, so it only needs the inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    cos: f64,
    sin: f64,
    scale_x: f64,
    scale_y: f64,
    src_cx: f64,
    src_cy: f64,
    dst_cx: f64,
    dst_cy: f64,
    bounds: (u32, u32),
}

impl Transform {
    pub fn new(
        src_width: u32,
        src_height: u32,
        angle_degrees: f64,
        flip_horizontal: bool,
        flip_vertical: bool,
    ) -> Self {
        let (cos, sin) = cos_sin(angle_degrees);
        let bounds = compute_rotated_bounds(src_width, src_height, angle_degrees);
        Self {
            cos,
            sin,
            scale_x: if flip_horizontal { -1.0 } else { 1.0 },
            scale_y: if flip_vertical { -1.0 } else { 1.0 },
            src_cx: src_width as f64 / 2.0,
            src_cy: src_height as f64 / 2.0,
            dst_cx: bounds.0 as f64 / 2.0,
            dst_cy: bounds.1 as f64 / 2.0,
            bounds,
        }
    }

    /// Size of the intermediate surface this transform draws into.
    pub fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    /// Map a point in destination space back into source space.
    #[inline]
    pub fn to_source(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.dst_cx;
        let dy = y - self.dst_cy;
        let u = self.cos * dx + self.sin * dy;
        let v = -self.sin * dx + self.cos * dy;
        (self.src_cx + self.scale_x * u, self.src_cy + self.scale_y * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rotation_is_exact() {
        assert_eq!(compute_rotated_bounds(400, 300, 0.0), (400, 300));
        assert_eq!(compute_rotated_bounds(1, 1, 0.0), (1, 1));
    }

    #[test]
    fn test_quarter_turn_bounds() {
        assert_eq!(compute_rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, 180.0), (100, 50));
        assert_eq!(compute_rotated_bounds(100, 50, 270.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, -90.0), (50, 100));
    }

    #[test]
    fn test_large_rotation_angles() {
        assert_eq!(compute_rotated_bounds(100, 50, 720.0), (100, 50));
        assert_eq!(compute_rotated_bounds(100, 50, 450.0), (50, 100));
        assert_eq!(compute_rotated_bounds(100, 50, -630.0), (50, 100));
    }

    #[test]
    fn test_45_degree_bounds_round_up() {
        // 100 * (cos 45 + sin 45) = 141.42...
        assert_eq!(compute_rotated_bounds(100, 100, 45.0), (142, 142));
    }

    #[test]
    fn test_opposite_rotations_same_bounds() {
        assert_eq!(
            compute_rotated_bounds(100, 80, 30.0),
            compute_rotated_bounds(100, 80, -30.0)
        );
    }

    #[test]
    fn test_quarter_turns() {
        assert_eq!(quarter_turns(0.0), Some(0));
        assert_eq!(quarter_turns(-90.0), Some(3));
        assert_eq!(quarter_turns(450.0), Some(1));
        assert_eq!(quarter_turns(359.9999999999), Some(0));
        assert_eq!(quarter_turns(30.0), None);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn test_crop_fits_within() {
        assert!(CropRect::full(10, 10).fits_within(10, 10));
        assert!(!CropRect::new(5, 0, 6, 10).fits_within(10, 10));
        assert!(!CropRect::new(0, 0, 0, 5).fits_within(10, 10));
        assert!(!CropRect::new(u32::MAX, 0, 2, 2).fits_within(10, 10));
    }

    #[test]
    fn test_crop_clamping() {
        let clamped = CropRect::new(8, 6, 10, 10).clamped_to(10, 8);
        assert_eq!(clamped, CropRect::new(0, 0, 10, 8));

        let clamped = CropRect::new(8, 6, 4, 4).clamped_to(10, 8);
        assert_eq!(clamped, CropRect::new(6, 4, 4, 4));

        let clamped = CropRect::new(3, 3, 0, 0).clamped_to(10, 8);
        assert_eq!(clamped, CropRect::new(3, 3, 1, 1));

        assert!(CropRect::full(5, 5).clamped_to(0, 0).is_empty());
    }

    #[test]
    fn test_crop_display() {
        assert_eq!(CropRect::new(1, 2, 30, 40).to_string(), "30x40 at (1, 2)");
    }

    #[test]
    fn test_resize_about_center() {
        let full = CropRect::full(300, 200);
        let zoomed = full.resized_about_center(150, 100, 300, 200);
        assert_eq!(zoomed, CropRect::new(75, 50, 150, 100));
    }

    #[test]
    fn test_identity_transform_maps_centers() {
        let t = Transform::new(4, 3, 0.0, false, false);
        assert_eq!(t.bounds(), (4, 3));
        assert_eq!(t.to_source(0.5, 0.5), (0.5, 0.5));
        assert_eq!(t.to_source(3.5, 2.5), (3.5, 2.5));
    }

    #[test]
    fn test_quarter_turn_transform_is_clockwise() {
        let t = Transform::new(4, 2, 90.0, false, false);
        assert_eq!(t.bounds(), (2, 4));
        // Top-right of the output comes from the top-left of the source.
        assert_eq!(t.to_source(1.5, 0.5), (0.5, 0.5));
        // Bottom-right of the output comes from the top-right of the source.
        assert_eq!(t.to_source(1.5, 3.5), (3.5, 0.5));
    }

    #[test]
    fn test_horizontal_flip_transform() {
        let t = Transform::new(4, 2, 0.0, true, false);
        assert_eq!(t.to_source(0.5, 0.5), (3.5, 0.5));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_square_bounds_never_shrink(size in 1u32..=2000, angle in -1080.0f64..1080.0) {
            let (w, h) = compute_rotated_bounds(size, size, angle);
            prop_assert!(w >= size && h >= size);
        }

        #[test]
        fn prop_half_turns_keep_square_bounds(size in 1u32..=2000, turns in -8i32..=8) {
            let angle = turns as f64 * 180.0;
            prop_assert_eq!(compute_rotated_bounds(size, size, angle), (size, size));
        }

        #[test]
        fn prop_bounds_periodic(w in 1u32..=500, h in 1u32..=500, angle in -360.0f64..360.0) {
            prop_assert_eq!(
                compute_rotated_bounds(w, h, angle),
                compute_rotated_bounds(w, h, angle + 360.0)
            );
        }

        #[test]
        fn prop_clamped_crop_fits(
            x in 0u32..5000, y in 0u32..5000, cw in 0u32..5000, ch in 0u32..5000,
            fw in 1u32..3000, fh in 1u32..3000,
        ) {
            let clamped = CropRect::new(x, y, cw, ch).clamped_to(fw, fh);
            prop_assert!(clamped.fits_within(fw, fh));
        }
    }
}
