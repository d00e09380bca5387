//! Source image decoding.
//!
//! - Decoding JPEG/PNG bytes into RGB pixel buffers with EXIF orientation
//! - The `PixelBuffer` type shared by the compositor and encoder
//! - Downscaling for thumbnails
//!
//! Everything here is synchronous; fetching the bytes is the job of a
//! [`SourceLoader`](crate::controller::SourceLoader).

mod resize;
mod source;
mod types;

pub use resize::resize_to_fit;
pub use source::{decode_image, get_orientation};
pub use types::{DecodeError, Orientation, PixelBuffer, WHITE};
