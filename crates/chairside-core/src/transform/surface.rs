//! Drawing surfaces for the compositor.
//!
//! A `Surface` plays the role of an offscreen canvas. It starts opaque white
//! and acquisition can fail, which callers must handle.

use serde::{Deserialize, Serialize};

use super::geometry::{CropRect, Transform};
use super::RenderError;
use crate::decode::{PixelBuffer, WHITE};

/// Size limits for a single surface.
///
/// The defaults match the largest canvas current browsers will allocate;
/// anything bigger fails there too, just later and less clearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceLimits {
    /// Maximum width or height in pixels.
    pub max_dimension: u32,
    /// Maximum width * height.
    pub max_area: u64,
}

impl Default for SurfaceLimits {
    fn default() -> Self {
        Self {
            max_dimension: 32_767,
            max_area: 268_435_456,
        }
    }
}

/// Sampling used when drawing the source under a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Exact pixel copies; quarter turns and flips are lossless.
    #[default]
    Nearest,
    /// Smoother edges for arbitrary angles.
    Bilinear,
}

/// An offscreen RGB drawing surface.
#[derive(Debug)]
pub struct Surface {
    buffer: PixelBuffer,
}

impl Surface {
    /// Allocate a surface filled with opaque white.
    ///
    /// # Errors
    ///
    /// `RenderError::SurfaceUnavailable` if either dimension is zero or the
    /// surface would exceed `limits`.
    pub fn acquire(width: u32, height: u32, limits: &SurfaceLimits) -> Result<Self, RenderError> {
        let unavailable = |reason: &str| RenderError::SurfaceUnavailable {
            width,
            height,
            reason: reason.to_string(),
        };

        if width == 0 || height == 0 {
            return Err(unavailable("zero-sized surface"));
        }
        if width > limits.max_dimension || height > limits.max_dimension {
            return Err(unavailable("dimension exceeds limit"));
        }
        if width as u64 * height as u64 > limits.max_area {
            return Err(unavailable("area exceeds limit"));
        }

        Ok(Self {
            buffer: PixelBuffer::filled(width, height, WHITE),
        })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Draw `source` through `transform`, leaving uncovered pixels white.
    pub fn draw_transformed(
        &mut self,
        source: &PixelBuffer,
        transform: &Transform,
        filter: InterpolationFilter,
    ) {
        let (w, h) = (source.width as f64, source.height as f64);

        for dst_y in 0..self.buffer.height {
            for dst_x in 0..self.buffer.width {
                let (sx, sy) = transform.to_source(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
                if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
                    continue;
                }
                let rgb = match filter {
                    InterpolationFilter::Nearest => sample_nearest(source, sx, sy),
                    InterpolationFilter::Bilinear => sample_bilinear(source, sx, sy),
                };
                self.buffer.set_pixel(dst_x, dst_y, rgb);
            }
        }
    }

    /// Copy `rect` from this surface to the origin of `dst`.
    ///
    /// The caller guarantees `rect` fits inside this surface and `dst` is at
    /// least `rect` sized.
    pub fn copy_region_to(&self, rect: &CropRect, dst: &mut Surface) {
        let row_bytes = rect.width as usize * 3;
        for row in 0..rect.height {
            let src_row = self.buffer.row(rect.y + row);
            let start = rect.x as usize * 3;
            let dst_start = row as usize * dst.buffer.width as usize * 3;
            dst.buffer.pixels[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src_row[start..start + row_bytes]);
        }
    }

    /// Free the pixel memory now instead of at end of scope.
    pub fn release(&mut self) {
        self.buffer.release();
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

#[inline]
fn sample_nearest(image: &PixelBuffer, x: f64, y: f64) -> [u8; 3] {
    let px = (x.floor() as u32).min(image.width - 1);
    let py = (y.floor() as u32).min(image.height - 1);
    image.pixel(px, py)
}

/// Bilinear sampling between the four nearest pixel centers. Neighbors past
/// the edge reuse the edge pixel.
fn sample_bilinear(image: &PixelBuffer, x: f64, y: f64) -> [u8; 3] {
    let fx = (x - 0.5).max(0.0);
    let fy = (y - 0.5).max(0.0);
    let x0 = (fx.floor() as u32).min(image.width - 1);
    let y0 = (fy.floor() as u32).min(image.height - 1);
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] as f64 * (1.0 - tx) * (1.0 - ty)
            + p10[i] as f64 * tx * (1.0 - ty)
            + p01[i] as f64 * (1.0 - tx) * ty
            + p11[i] as f64 * tx * ty;
        out[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    out
}
