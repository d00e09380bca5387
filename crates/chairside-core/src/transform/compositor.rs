//! The canvas compositor: source + session in, cropped pixels out.

use thiserror::Error;
use tracing::debug;

use super::geometry::{CropRect, Transform};
use super::surface::{InterpolationFilter, Surface, SurfaceLimits};
use crate::decode::PixelBuffer;
use crate::session::EditSession;

/// Errors that can occur while rendering an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A drawing surface could not be allocated.
    #[error("Drawing surface unavailable for {width}x{height}: {reason}")]
    SurfaceUnavailable {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The crop rectangle is not fully inside the rotated image.
    #[error("Crop {crop} lies outside the {bounds_width}x{bounds_height} image")]
    CropOutOfBounds {
        crop: CropRect,
        bounds_width: u32,
        bounds_height: u32,
    },

    /// The source image has no pixels.
    #[error("Source image is empty")]
    EmptySource,

    /// The source pixel data does not match its dimensions.
    #[error("Invalid source pixel data: expected {expected} bytes, got {actual}")]
    InvalidSource { expected: u64, actual: usize },
}

/// Knobs for a single render call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderOptions {
    pub filter: InterpolationFilter,
    pub limits: SurfaceLimits,
}

/// Render `session` applied to `source` with default options.
pub fn render(source: &PixelBuffer, session: &EditSession) -> Result<PixelBuffer, RenderError> {
    render_with(source, session, &RenderOptions::default())
}

/// Render `session` applied to `source`.
///
/// The result is exactly `crop.width x crop.height`. Rendering is
/// deterministic: the same inputs always produce the same pixels.
///
/// # Errors
///
/// - `RenderError::EmptySource` for a zero-sized source
/// - `RenderError::InvalidSource` if the pixel data length is not
///   `width * height * 3`
/// - `RenderError::CropOutOfBounds` if the crop is empty or not fully inside
///   the rotated bounds; out-of-range crops are rejected, never clipped
/// - `RenderError::SurfaceUnavailable` if a surface exceeds `options.limits`
pub fn render_with(
    source: &PixelBuffer,
    session: &EditSession,
    options: &RenderOptions,
) -> Result<PixelBuffer, RenderError> {
    if source.is_empty() {
        return Err(RenderError::EmptySource);
    }
    let expected = source.pixel_count() * 3;
    if source.pixels.len() as u64 != expected {
        return Err(RenderError::InvalidSource {
            expected,
            actual: source.pixels.len(),
        });
    }

    let transform = Transform::new(
        source.width,
        source.height,
        session.rotation_degrees(),
        session.flip_horizontal(),
        session.flip_vertical(),
    );
    let (bounds_width, bounds_height) = transform.bounds();

    let crop = session.crop_rect();
    if !crop.fits_within(bounds_width, bounds_height) {
        return Err(RenderError::CropOutOfBounds {
            crop,
            bounds_width,
            bounds_height,
        });
    }

    let mut intermediate = Surface::acquire(bounds_width, bounds_height, &options.limits)?;
    intermediate.draw_transformed(source, &transform, options.filter);

    let mut output = Surface::acquire(crop.width, crop.height, &options.limits)?;
    intermediate.copy_region_to(&crop, &mut output);
    intermediate.release();

    debug!(
        source_width = source.width,
        source_height = source.height,
        rotation = session.rotation_degrees(),
        bounds_width,
        bounds_height,
        crop_width = crop.width,
        crop_height = crop.height,
        "Rendered edit"
    );

    Ok(output.into_buffer())
}
