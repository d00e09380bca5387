//! JPEG encoding for saved edits and thumbnails.
//!
//! Output is always JPEG: every browser and the storage preview service can
//! display it, and intraoral photos compress well at the qualities we use.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::{resize_to_fit, PixelBuffer};

/// Quality used for grid thumbnails of derived files.
pub const THUMBNAIL_QUALITY: f32 = 0.7;

/// Quality used when saving an edited image as a derived file.
pub const SAVE_QUALITY: f32 = 0.92;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The buffer has no pixels to encode.
    #[error("Cannot encode an empty {width}x{height} buffer")]
    EmptyBuffer { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Quality is not a number in [0, 1].
    #[error("Invalid quality {0}: expected a value between 0 and 1")]
    InvalidQuality(f32),

    /// The underlying encoder failed.
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// The encoder returned something that is not a complete JPEG.
    #[error("Encoder produced a degenerate payload ({0} bytes)")]
    DegenerateOutput(usize),
}

/// A compressed image ready to be named and uploaded by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedResult {
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
    /// Quality factor in [0, 1] used to produce the bytes.
    pub quality: f32,
}

impl EncodedResult {
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    /// Render as a `data:` URI, the form the upload helpers accept.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode a pixel buffer to JPEG at a quality in `[0, 1]`.
///
/// # Errors
///
/// Empty buffers and mismatched pixel lengths are rejected up front. The
/// encoder's output is then checked for SOI/EOI markers so a degenerate
/// payload is reported as an error instead of being handed to the uploader.
pub fn encode(buffer: &PixelBuffer, quality: f32) -> Result<EncodedResult, EncodeError> {
    let bytes = encode_jpeg(&buffer.pixels, buffer.width, buffer.height, quality)?;
    Ok(EncodedResult {
        bytes,
        width: buffer.width,
        height: buffer.height,
        quality,
    })
}

/// Downscale to fit within `max_edge` and encode, typically at
/// [`THUMBNAIL_QUALITY`].
pub fn encode_thumbnail(
    buffer: &PixelBuffer,
    max_edge: u32,
    quality: f32,
) -> Result<EncodedResult, EncodeError> {
    if buffer.is_empty() {
        return Err(EncodeError::EmptyBuffer {
            width: buffer.width,
            height: buffer.height,
        });
    }
    let small = resize_to_fit(buffer, max_edge)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    encode(&small, quality)
}

/// Encode raw RGB pixel data to JPEG bytes.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 || pixels.is_empty() {
        return Err(EncodeError::EmptyBuffer { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let jpeg_quality = quality_to_jpeg(quality)?;

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, jpeg_quality)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    if bytes.len() < 4 || bytes[..2] != SOI || bytes[bytes.len() - 2..] != EOI {
        return Err(EncodeError::DegenerateOutput(bytes.len()));
    }
    Ok(bytes)
}

/// Map a `[0, 1]` quality factor onto the encoder's 1-100 scale.
fn quality_to_jpeg(quality: f32) -> Result<u8, EncodeError> {
    if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
        return Err(EncodeError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).clamp(1, 100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(128);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_encode_basic() {
        let result = encode(&gradient(100, 100), SAVE_QUALITY).unwrap();
        assert_eq!(&result.bytes[0..2], &SOI);
        assert_eq!(&result.bytes[result.len() - 2..], &EOI);
        assert_eq!((result.width, result.height), (100, 100));
        assert_eq!(result.quality, SAVE_QUALITY);
    }

    #[test]
    fn test_encode_empty_buffer_fails() {
        let empty = PixelBuffer::new(0, 0, vec![]);
        let result = encode(&empty, SAVE_QUALITY);
        assert!(matches!(
            result,
            Err(EncodeError::EmptyBuffer { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_encode_zero_height_fails() {
        let result = encode_jpeg(&[], 100, 0, 0.9);
        assert!(matches!(result, Err(EncodeError::EmptyBuffer { .. })));
    }

    #[test]
    fn test_encode_pixel_length_mismatch() {
        let pixels = vec![128u8; 99 * 100 * 3];
        let result = encode_jpeg(&pixels, 100, 100, 0.9);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_rejects_bad_quality() {
        let buf = gradient(10, 10);
        assert!(matches!(encode(&buf, 1.5), Err(EncodeError::InvalidQuality(_))));
        assert!(matches!(encode(&buf, -0.1), Err(EncodeError::InvalidQuality(_))));
        assert!(matches!(encode(&buf, f32::NAN), Err(EncodeError::InvalidQuality(_))));
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_to_jpeg(0.0).unwrap(), 1);
        assert_eq!(quality_to_jpeg(0.7).unwrap(), 70);
        assert_eq!(quality_to_jpeg(0.92).unwrap(), 92);
        assert_eq!(quality_to_jpeg(1.0).unwrap(), 100);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let buf = gradient(64, 64);
        let thumb = encode(&buf, THUMBNAIL_QUALITY).unwrap();
        let full = encode(&buf, 1.0).unwrap();
        assert!(thumb.len() < full.len());
    }

    #[test]
    fn test_round_trip_preserves_dimensions() {
        let encoded = encode(&gradient(37, 21), SAVE_QUALITY).unwrap();
        let decoded = decode_image(&encoded.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (37, 21));
    }

    #[test]
    fn test_data_uri() {
        let encoded = encode(&gradient(4, 4), SAVE_QUALITY).unwrap();
        let uri = encoded.to_data_uri();
        assert!(uri.starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[test]
    fn test_thumbnail_fits_edge() {
        let thumb = encode_thumbnail(&gradient(400, 200), 100, THUMBNAIL_QUALITY).unwrap();
        assert_eq!((thumb.width, thumb.height), (100, 50));
        assert_eq!(thumb.quality, THUMBNAIL_QUALITY);
    }

    #[test]
    fn test_thumbnail_of_empty_buffer_fails() {
        let empty = PixelBuffer::new(0, 0, vec![]);
        assert!(matches!(
            encode_thumbnail(&empty, 100, THUMBNAIL_QUALITY),
            Err(EncodeError::EmptyBuffer { .. })
        ));
    }
}
