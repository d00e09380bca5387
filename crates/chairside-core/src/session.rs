//! Interactive edit state for one open editor.
//!
//! An `EditSession` is created when the user opens a photo, mutated on every
//! pointer or slider event, and dropped on save or cancel. It is never
//! persisted.

use serde::Serialize;

use crate::transform::{compute_rotated_bounds, quarter_turns, CropRect};

/// Default zoom range of the crop viewport.
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 3.0;

/// Crop, zoom, rotation and flip state for one source image.
///
/// The crop rectangle is kept inside the rotated bounds of the source at
/// all times: every setter clamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    source_width: u32,
    source_height: u32,
    pub(crate) crop_rect: CropRect,
    zoom: f64,
    rotation_degrees: f64,
    flip_horizontal: bool,
    flip_vertical: bool,
    #[serde(skip)]
    zoom_range: (f64, f64),
}

impl EditSession {
    /// A fresh session: no rotation or flip, zoom 1, crop covering the frame.
    pub fn new(source_width: u32, source_height: u32) -> Self {
        Self::with_zoom_range(source_width, source_height, MIN_ZOOM, MAX_ZOOM)
    }

    /// Like [`EditSession::new`] with a custom zoom range.
    ///
    /// A `min` above `max` is swapped; non-positive bounds fall back to the
    /// defaults.
    pub fn with_zoom_range(source_width: u32, source_height: u32, min: f64, max: f64) -> Self {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        let zoom_range = if min.is_finite() && max.is_finite() && min > 0.0 {
            (min, max)
        } else {
            (MIN_ZOOM, MAX_ZOOM)
        };

        let mut session = Self {
            source_width,
            source_height,
            crop_rect: CropRect::full(source_width, source_height),
            zoom: 1.0_f64.clamp(zoom_range.0, zoom_range.1),
            rotation_degrees: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            zoom_range,
        };
        session.crop_rect = session.zoom_frame();
        session
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn crop_rect(&self) -> CropRect {
        self.crop_rect
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        self.zoom_range
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    pub fn flip_horizontal(&self) -> bool {
        self.flip_horizontal
    }

    pub fn flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    /// Size of the rotated source, the space crop rectangles live in.
    pub fn bounds(&self) -> (u32, u32) {
        compute_rotated_bounds(self.source_width, self.source_height, self.rotation_degrees)
    }

    /// Whether there is a non-empty crop selection to save.
    pub fn has_crop_selection(&self) -> bool {
        let (bw, bh) = self.bounds();
        self.crop_rect.fits_within(bw, bh)
    }

    /// Set the crop rectangle, clamped into the rotated bounds. Returns the
    /// rectangle actually stored.
    pub fn set_crop(&mut self, rect: CropRect) -> CropRect {
        let (bw, bh) = self.bounds();
        self.crop_rect = rect.clamped_to(bw, bh);
        self.crop_rect
    }

    /// Set the zoom, clamped to the session's range, and rescale the crop
    /// about its center to `bounds / zoom`. Non-finite input is ignored.
    /// Returns the zoom actually stored.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if !zoom.is_finite() {
            return self.zoom;
        }
        self.zoom = zoom.clamp(self.zoom_range.0, self.zoom_range.1);

        let (bw, bh) = self.bounds();
        let (fw, fh) = self.zoomed_size();
        self.crop_rect = self.crop_rect.resized_about_center(fw, fh, bw, bh);
        self.zoom
    }

    /// Set an absolute rotation. Any finite value is accepted; the crop is
    /// recentered on the new bounds at the current zoom.
    pub fn set_rotation(&mut self, degrees: f64) {
        if !degrees.is_finite() {
            return;
        }
        self.rotation_degrees = degrees;
        self.crop_rect = self.zoom_frame();
    }

    /// Rotate relative to the current angle (e.g. the 90° buttons).
    pub fn rotate_by(&mut self, delta_degrees: f64) {
        self.set_rotation(self.rotation_degrees + delta_degrees);
    }

    /// Mirror the source left-to-right. The crop follows the content it
    /// covered while the rotation is a quarter turn, and resets to the zoom
    /// frame otherwise.
    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
        self.mirror_crop(true);
    }

    /// Mirror the source top-to-bottom, moving the crop with it.
    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
        self.mirror_crop(false);
    }

    /// Move the crop to where its content lands after a source-space flip.
    ///
    /// At a quarter turn the flip is an axis-aligned mirror of the rotated
    /// frame, along the other axis for odd turns. At any other angle the
    /// mirrored region is not a rectangle, so the crop resets to the zoom
    /// frame instead.
    fn mirror_crop(&mut self, source_horizontal: bool) {
        let Some(turns) = quarter_turns(self.rotation_degrees) else {
            self.crop_rect = self.zoom_frame();
            return;
        };

        let (bw, bh) = self.bounds();
        if source_horizontal == (turns % 2 == 0) {
            let right = self.crop_rect.right().min(bw as u64) as u32;
            self.crop_rect.x = bw - right;
        } else {
            let bottom = self.crop_rect.bottom().min(bh as u64) as u32;
            self.crop_rect.y = bh - bottom;
        }
    }

    /// Back to the state of a freshly opened editor.
    pub fn reset(&mut self) {
        *self = Self::with_zoom_range(
            self.source_width,
            self.source_height,
            self.zoom_range.0,
            self.zoom_range.1,
        );
    }

    fn zoomed_size(&self) -> (u32, u32) {
        let (bw, bh) = self.bounds();
        let scale = |v: u32| ((v as f64 / self.zoom).round() as u32).max(1);
        (scale(bw), scale(bh))
    }

    /// The centered crop that the current zoom shows.
    fn zoom_frame(&self) -> CropRect {
        let (bw, bh) = self.bounds();
        let (fw, fh) = self.zoomed_size();
        CropRect::full(bw, bh).resized_about_center(fw, fh, bw, bh)
    }
}
