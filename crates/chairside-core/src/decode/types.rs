//! Core types for source image decoding.

use thiserror::Error;

/// Error types for loading and decoding a source image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes are not an image format we can read.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The source produced no bytes at all.
    #[error("Source image is empty")]
    Empty,

    /// The image data is corrupted or truncated.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The transport failed before a response arrived.
    #[error("Failed to fetch source image: {0}")]
    Fetch(String),

    /// The storage endpoint answered with a non-success status.
    #[error("Source image request failed with HTTP {status}")]
    Http { status: u16 },

    /// A storage URL could not be resolved to a download URL.
    #[error("Could not resolve source URL: {0}")]
    Resolve(String),
}

impl DecodeError {
    /// Whether another attempt at loading the same source could succeed.
    ///
    /// Network failures and truncated downloads are transient. A 404 or bytes
    /// that are simply not an image will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            DecodeError::Fetch(_) | DecodeError::Resolve(_) | DecodeError::CorruptedFile(_) => {
                true
            }
            DecodeError::Http { status } => *status != 404 && *status != 410,
            DecodeError::InvalidFormat | DecodeError::Empty => false,
        }
    }
}

/// EXIF orientation as "rotate clockwise by quarter turns, then mirror
/// left-right". All eight tag values reduce to this form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub quarter_turns: u8,
    pub mirror: bool,
}

impl Orientation {
    pub const UPRIGHT: Orientation = Orientation {
        quarter_turns: 0,
        mirror: false,
    };

    /// Map an EXIF orientation tag (1-8). Unknown values are treated as upright.
    pub fn from_exif(tag: u32) -> Self {
        let (quarter_turns, mirror) = match tag {
            2 => (0, true),
            3 => (2, false),
            4 => (2, true),
            5 => (1, true),
            6 => (1, false),
            7 => (3, true),
            8 => (3, false),
            _ => (0, false),
        };
        Self {
            quarter_turns,
            mirror,
        }
    }

    pub fn is_upright(self) -> bool {
        self == Self::UPRIGHT
    }
}

/// Opaque white, the background every surface starts with.
pub const WHITE: [u8; 3] = [255, 255, 255];

/// An RGB8 pixel buffer.
///
/// Used for decoded source images, compositor surfaces and render output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new PixelBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer where every pixel has the same color.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a PixelBuffer from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Read the pixel at (x, y). Panics if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = self.index(x, y);
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Write the pixel at (x, y). Panics if out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = self.index(x, y);
        self.pixels[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Borrow one row of pixel data.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize * 3]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Drop the pixel data and shrink to zero size.
    pub fn release(&mut self) {
        self.width = 0;
        self.height = 0;
        self.pixels = Vec::new();
    }
}
