//! WASM-compatible wrapper types for edit results.

use chairside_core::{EncodedResult, SavedEdit};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// An encoded edit, ready for the caller to name and upload.
///
/// # Memory Management
///
/// The bytes live in WASM memory. `bytes()` and `data_uri()` copy them into
/// JavaScript; call `free()` once the upload has been started to release the
/// WASM side early.
#[wasm_bindgen]
pub struct JsEncodedResult {
    inner: EncodedResult,
}

#[wasm_bindgen]
impl JsEncodedResult {
    /// Pixel width of the encoded image
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Pixel height of the encoded image
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Quality factor in [0, 1] used for encoding
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.inner.quality
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type().to_string()
    }

    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.inner.len()
    }

    /// JPEG bytes as a `Uint8Array` (copied), e.g. for `new Blob([...])`.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    /// The payload as a `data:image/jpeg;base64,...` string.
    #[wasm_bindgen(js_name = dataUri)]
    pub fn data_uri(&self) -> String {
        self.inner.to_data_uri()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl From<EncodedResult> for JsEncodedResult {
    fn from(inner: EncodedResult) -> Self {
        Self { inner }
    }
}

/// A saved edit plus its grid thumbnail.
#[wasm_bindgen]
pub struct JsSavedEdit {
    image: EncodedResult,
    thumbnail: EncodedResult,
}

#[wasm_bindgen]
impl JsSavedEdit {
    #[wasm_bindgen(getter)]
    pub fn image(&self) -> JsEncodedResult {
        self.image.clone().into()
    }

    #[wasm_bindgen(getter)]
    pub fn thumbnail(&self) -> JsEncodedResult {
        self.thumbnail.clone().into()
    }
}

impl From<SavedEdit> for JsSavedEdit {
    fn from(saved: SavedEdit) -> Self {
        Self {
            image: saved.image,
            thumbnail: saved.thumbnail,
        }
    }
}

/// Convert any displayable error into the string form JS callers expect.
pub(crate) fn to_js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
