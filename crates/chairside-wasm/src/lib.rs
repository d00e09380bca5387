//! Chairside WASM - WebAssembly bindings for the image editor
//!
//! This crate exposes the chairside-core edit pipeline to the file manager
//! page.
//!
//! # Module Structure
//!
//! - `editor` - `JsEditor`, the edit dialog's session controller
//! - `loader` - `fetch`/`setTimeout` backed source loading
//! - `types` - WASM-compatible wrappers for encoded output
//! - `encode` - Standalone JPEG encoding
//! - `transform` - Rotated canvas geometry
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor } from '@chairside/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor();
//! editor.openBytes(new Uint8Array(await file.arrayBuffer()));
//! await editor.load();
//! const result = editor.save();
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod encode;
mod loader;
mod transform;
mod types;

pub use editor::JsEditor;
pub use encode::encode_jpeg;
pub use loader::{FetchLoader, TimeoutSleeper};
pub use transform::compute_rotated_bounds;
pub use types::{JsEncodedResult, JsSavedEdit};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);
