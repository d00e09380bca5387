//! Standalone JPEG encoding binding.
//!
//! Most callers get encoded output from `JsEditor.save`. This entry point is
//! for pixels that never went through an edit session.

use chairside_core::encode;
use wasm_bindgen::prelude::*;

use crate::types::to_js_error;

/// Encode RGB pixel data (3 bytes per pixel, row-major) to JPEG bytes.
///
/// `quality` is in [0, 1]; `0.92` matches the editor's save quality.
///
/// # Errors
///
/// Rejects empty images, pixel data whose length is not `width * height * 3`,
/// and qualities outside [0, 1].
///
/// # Example
///
/// ```typescript
/// const pixels = new Uint8Array(100 * 100 * 3).fill(128);
/// const jpeg = encode_jpeg(pixels, 100, 100, 0.92);
/// ```
#[wasm_bindgen]
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f32,
) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(to_js_error)
}
