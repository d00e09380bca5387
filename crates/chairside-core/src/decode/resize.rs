//! Downscaling for thumbnails of saved edits.

use image::imageops::{self, FilterType};

use super::{DecodeError, PixelBuffer};

/// Scale `image` down so its longest edge is `max_edge`, keeping the aspect
/// ratio. Images that already fit come back as a copy; nothing is upscaled.
///
/// # Errors
///
/// `DecodeError::InvalidFormat` for a zero `max_edge`, and
/// `DecodeError::CorruptedFile` if the buffer length does not match its size.
pub fn resize_to_fit(image: &PixelBuffer, max_edge: u32) -> Result<PixelBuffer, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (width, height) = fit_within(image.width, image.height, max_edge);
    let rgb = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".into()))?;
    let scaled = imageops::resize(&rgb, width, height, FilterType::Triangle);
    Ok(PixelBuffer::from_rgb_image(scaled))
}

/// Dimensions of `width` x `height` scaled so the longer side is `max_edge`.
/// The shorter side never drops below one pixel.
fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let scale = max_edge as f64 / width.max(height) as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_edge);
    (scaled(width), scaled(height))
}
