//! Source image decoding with EXIF orientation handling.
//!
//! Dental intraoral photos come straight off phones and DSLRs, so the EXIF
//! orientation tag is honoured the same way a browser `<img>` would before
//! the user ever sees the editor.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Orientation, PixelBuffer};

/// Decode image bytes (JPEG or PNG) into an RGB buffer, applying EXIF
/// orientation correction.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for zero-length input,
/// `DecodeError::InvalidFormat` if the format cannot be guessed, and
/// `DecodeError::CorruptedFile` if the data is truncated or damaged.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let orientation = get_orientation(bytes);
    let img = decode_dynamic(bytes)?;
    let oriented = apply_orientation(img, orientation);

    let buffer = PixelBuffer::from_rgb_image(oriented.into_rgb8());
    if buffer.is_empty() {
        return Err(DecodeError::CorruptedFile("decoded image has no pixels".into()));
    }
    Ok(buffer)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Extract the EXIF orientation from image bytes.
///
/// Images without EXIF data are upright.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from_exif)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    let turned = match orientation.quarter_turns % 4 {
        1 => img.rotate90(),
        2 => img.rotate180(),
        3 => img.rotate270(),
        _ => img,
    };
    if orientation.mirror {
        turned.fliph()
    } else {
        turned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    use crate::encode::encode_jpeg;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        encode_jpeg(&vec![180; (width * height * 3) as usize], width, height, 0.9).unwrap()
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 40) as u8, (y * 40) as u8, 7])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn two_pixels() -> DynamicImage {
        let rgb = image::RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        DynamicImage::ImageRgb8(rgb)
    }

    #[test]
    fn test_decode_jpeg() {
        let img = decode_image(&jpeg_bytes(5, 3)).unwrap();
        assert_eq!((img.width, img.height), (5, 3));
        assert_eq!(img.pixels.len(), 45);
    }

    #[test]
    fn test_decode_png_keeps_pixels() {
        let img = decode_image(&png_bytes(3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixel(2, 1), [80, 40, 7]);
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert_eq!(decode_image(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn test_decode_garbage_is_invalid_format() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert_eq!(result, Err(DecodeError::InvalidFormat));
    }

    #[test]
    fn test_decode_header_only_jpeg() {
        let bytes = jpeg_bytes(4, 4);
        let result = decode_image(&bytes[..20]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        assert!(get_orientation(&jpeg_bytes(2, 2)).is_upright());
        assert!(get_orientation(&[0x00, 0x01]).is_upright());
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let result = apply_orientation(two_pixels(), Orientation::from_exif(6)).into_rgb8();
        assert_eq!(result.dimensions(), (1, 2));
        // Clockwise: the left pixel ends up on top.
        assert_eq!(result.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_mirror_swaps_columns() {
        let result = apply_orientation(two_pixels(), Orientation::from_exif(2)).into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_vertical_flip_as_half_turn_and_mirror() {
        let rgb = image::RgbImage::from_raw(1, 2, vec![255, 0, 0, 0, 0, 255]).unwrap();
        let result =
            apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::from_exif(4)).into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(result.get_pixel(0, 1).0, [255, 0, 0]);
    }
}
