//! Editor tunables.
//!
//! Nothing here is persisted. The host page passes a plain object (or
//! nothing) when it creates an editor; missing fields take the defaults.

use serde::{Deserialize, Serialize};

use crate::encode::{SAVE_QUALITY, THUMBNAIL_QUALITY};
use crate::retry::RetryPolicy;
use crate::session::{MAX_ZOOM, MIN_ZOOM};
use crate::transform::{InterpolationFilter, RenderOptions, SurfaceLimits};

/// Configuration for an [`EditController`](crate::controller::EditController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// JPEG quality in [0, 1] for saved derived files.
    pub save_quality: f32,
    /// JPEG quality in [0, 1] for thumbnails.
    pub thumbnail_quality: f32,
    /// Longest edge of generated thumbnails, in pixels.
    pub thumbnail_edge: u32,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Sampling used when drawing the rotated source.
    pub filter: InterpolationFilter,
    pub surface_limits: SurfaceLimits,
    /// Backoff for fetching the source image.
    pub retry: RetryPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_quality: SAVE_QUALITY,
            thumbnail_quality: THUMBNAIL_QUALITY,
            thumbnail_edge: 320,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            filter: InterpolationFilter::default(),
            surface_limits: SurfaceLimits::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl EditorConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            filter: self.filter,
            limits: self.surface_limits,
        }
    }
}
