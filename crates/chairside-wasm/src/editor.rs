//! The image editor exposed to the file manager page.
//!
//! # Example
//!
//! ```typescript
//! import init, { JsEditor } from '@chairside/wasm';
//!
//! await init();
//!
//! const editor = new JsEditor({ saveQuality: 0.92 }, (url) => storage.signedUrl(url));
//! editor.openUrl(file.url);
//! await editor.load();
//!
//! editor.rotateBy(90);
//! editor.setCrop(10, 10, 400, 300);
//!
//! const saved = editor.saveWithThumbnail();
//! await upload(saved.image.bytes(), saved.thumbnail.bytes());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use chairside_core::retry::Sleeper;
use chairside_core::{
    load_source, CropRect, EditController, EditError, EditSession, EditorConfig, ImageSource,
    SourceLoader,
};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::loader::{FetchLoader, TimeoutSleeper};
use crate::types::{to_js_error, JsEncodedResult, JsSavedEdit};

/// One edit dialog. Reuse it across files by calling `openUrl`/`openBytes`
/// again; the previous session is discarded.
#[wasm_bindgen]
pub struct JsEditor {
    controller: Rc<RefCell<EditController>>,
    resolver: Option<Function>,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor.
    ///
    /// `config` is a partial `EditorConfig` object (camelCase keys) or
    /// `undefined`. `resolver`, if given, maps a stored file URL to a
    /// downloadable one and may return a Promise.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, resolver: Option<Function>) -> Result<JsEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::with_config(config, resolver))
    }

    #[wasm_bindgen(js_name = openUrl)]
    pub fn open_url(&self, url: String) {
        self.controller.borrow_mut().open(ImageSource::Url(url));
    }

    #[wasm_bindgen(js_name = openBytes)]
    pub fn open_bytes(&self, bytes: Vec<u8>) {
        self.controller.borrow_mut().open(ImageSource::Bytes(bytes));
    }

    /// Fetch and decode the opened image. Resolves once the editor is ready.
    ///
    /// Rejects with a message if the image could not be loaded after
    /// retrying, or if the session was cancelled in the meantime.
    pub fn load(&self) -> Promise {
        let controller = Rc::clone(&self.controller);
        let loader = FetchLoader::new(self.resolver.clone());
        future_to_promise(async move {
            match load_shared(&controller, &loader, &TimeoutSleeper).await {
                Ok(()) => Ok(JsValue::UNDEFINED),
                Err(EditError::Cancelled) => Err(to_js_error(EditError::Cancelled)),
                Err(err) => {
                    web_sys::console::warn_1(&format!("Image load failed: {err}").into());
                    Err(to_js_error(err))
                }
            }
        })
    }

    /// Current lifecycle state: `idle`, `editing`, `ready`, `saving`,
    /// `saved` or `cancelled`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.controller.borrow().state().to_string()
    }

    /// Snapshot of the session for rendering controls, or `null`.
    #[wasm_bindgen(getter)]
    pub fn session(&self) -> Result<JsValue, JsValue> {
        match self.controller.borrow().session() {
            Some(session) => Ok(serde_wasm_bindgen::to_value(session)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Size of the rotated canvas as `[width, height]`.
    pub fn bounds(&self) -> Result<Vec<u32>, JsValue> {
        let controller = self.controller.borrow();
        let session = controller.session().ok_or_else(|| {
            to_js_error(EditError::InvalidState {
                action: "read bounds",
                state: controller.state(),
            })
        })?;
        let (width, height) = session.bounds();
        Ok(vec![width, height])
    }

    #[wasm_bindgen(js_name = setRotation)]
    pub fn set_rotation(&self, degrees: f64) -> Result<(), JsValue> {
        self.edit(|session| session.set_rotation(degrees))
    }

    #[wasm_bindgen(js_name = rotateBy)]
    pub fn rotate_by(&self, delta_degrees: f64) -> Result<(), JsValue> {
        self.edit(|session| session.rotate_by(delta_degrees))
    }

    #[wasm_bindgen(js_name = toggleFlipHorizontal)]
    pub fn toggle_flip_horizontal(&self) -> Result<(), JsValue> {
        self.edit(EditSession::toggle_flip_horizontal)
    }

    #[wasm_bindgen(js_name = toggleFlipVertical)]
    pub fn toggle_flip_vertical(&self) -> Result<(), JsValue> {
        self.edit(EditSession::toggle_flip_vertical)
    }

    /// Set the zoom factor. Returns the clamped value actually applied.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&self, zoom: f64) -> Result<f64, JsValue> {
        self.edit(|session| session.set_zoom(zoom))
    }

    /// Set the crop in rotated-canvas pixels. The rectangle is clamped to the
    /// canvas; read `session.cropRect` for the stored value.
    #[wasm_bindgen(js_name = setCrop)]
    pub fn set_crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<(), JsValue> {
        self.edit(|session| {
            session.set_crop(CropRect::new(x, y, width, height));
        })
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.edit(EditSession::reset)
    }

    /// Render and encode the edit. `quality` is in [0, 1] and defaults to the
    /// configured save quality.
    pub fn save(&self, quality: Option<f32>) -> Result<JsEncodedResult, JsValue> {
        let mut controller = self.controller.borrow_mut();
        let quality = quality.unwrap_or(controller.config().save_quality);
        controller
            .save(quality)
            .map(JsEncodedResult::from)
            .map_err(to_js_error)
    }

    /// Like `save`, but also returns a downscaled thumbnail.
    #[wasm_bindgen(js_name = saveWithThumbnail)]
    pub fn save_with_thumbnail(&self) -> Result<JsSavedEdit, JsValue> {
        self.controller
            .borrow_mut()
            .save_with_thumbnail()
            .map(JsSavedEdit::from)
            .map_err(to_js_error)
    }

    /// Close the dialog without saving. Pending loads are discarded.
    pub fn cancel(&self) {
        self.controller.borrow_mut().cancel();
    }
}

impl JsEditor {
    pub fn with_config(config: EditorConfig, resolver: Option<Function>) -> Self {
        Self {
            controller: Rc::new(RefCell::new(EditController::new(config))),
            resolver,
        }
    }

    fn edit<T>(&self, apply: impl FnOnce(&mut EditSession) -> T) -> Result<T, JsValue> {
        let mut controller = self.controller.borrow_mut();
        let session = controller.session_mut().map_err(to_js_error)?;
        Ok(apply(session))
    }
}

/// Load into a shared controller without holding a borrow across the fetch.
async fn load_shared(
    controller: &RefCell<EditController>,
    loader: &dyn SourceLoader,
    sleeper: &dyn Sleeper,
) -> Result<(), EditError> {
    let (ticket, policy) = {
        let controller = controller.borrow();
        (controller.begin_load()?, controller.config().retry)
    };
    let result = load_source(&ticket.source, loader, sleeper, &policy).await;
    controller.borrow_mut().finish_load(ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chairside_core::{encode, DecodeError, EditorState, PixelBuffer};
    use futures::executor::block_on;
    use std::time::Duration;

    struct NoFetch;

    #[async_trait(?Send)]
    impl SourceLoader for NoFetch {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, DecodeError> {
            Err(DecodeError::Fetch("offline".into()))
        }
    }

    struct NoSleep;

    #[async_trait(?Send)]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        encode(&PixelBuffer::filled(width, height, [30, 160, 90]), 0.9)
            .unwrap()
            .bytes
    }

    fn ready_editor(width: u32, height: u32) -> JsEditor {
        let editor = JsEditor::with_config(EditorConfig::default(), None);
        editor.open_bytes(jpeg(width, height));
        block_on(load_shared(&editor.controller, &NoFetch, &NoSleep)).unwrap();
        editor
    }

    #[test]
    fn test_open_and_load_bytes() {
        let editor = ready_editor(32, 24);
        assert_eq!(editor.state(), "ready");
        assert_eq!(editor.bounds().unwrap(), vec![32, 24]);
    }

    #[test]
    fn test_edits_flow_into_session() {
        let editor = ready_editor(40, 20);
        editor.rotate_by(90.0).unwrap();
        assert_eq!(editor.bounds().unwrap(), vec![20, 40]);

        editor.set_crop(2, 4, 10, 10).unwrap();
        editor.toggle_flip_vertical().unwrap();
        assert_eq!(editor.set_zoom(10.0).unwrap(), 3.0);

        let controller = editor.controller.borrow();
        let session = controller.session().unwrap();
        assert_eq!(session.rotation_degrees(), 90.0);
        assert!(session.flip_vertical());
    }

    #[test]
    fn test_save_returns_encoded_result() {
        let editor = ready_editor(30, 30);
        editor.set_crop(0, 0, 12, 8).unwrap();

        let result = editor.save(Some(0.8)).unwrap();
        assert_eq!((result.width(), result.height()), (12, 8));
        assert_eq!(result.quality(), 0.8);
        assert_eq!(editor.state(), "saved");
    }

    #[test]
    fn test_save_with_thumbnail_uses_config() {
        let config = EditorConfig {
            thumbnail_edge: 10,
            ..EditorConfig::default()
        };
        let editor = JsEditor::with_config(config, None);
        editor.open_bytes(jpeg(40, 20));
        block_on(load_shared(&editor.controller, &NoFetch, &NoSleep)).unwrap();

        let saved = editor.save_with_thumbnail().unwrap();
        assert_eq!(saved.image().width(), 40);
        assert_eq!((saved.thumbnail().width(), saved.thumbnail().height()), (10, 5));
    }

    #[test]
    fn test_url_load_failure_returns_to_idle() {
        let config = EditorConfig {
            retry: chairside_core::RetryPolicy::none(),
            ..EditorConfig::default()
        };
        let editor = JsEditor::with_config(config, None);
        editor.open_url("https://storage.example/photo.jpg".into());

        let result = block_on(load_shared(&editor.controller, &NoFetch, &NoSleep));
        assert!(matches!(result, Err(EditError::Decode(DecodeError::Fetch(_)))));
        assert_eq!(editor.controller.borrow().state(), EditorState::Idle);
    }

    #[test]
    fn test_cancel() {
        let editor = ready_editor(8, 8);
        editor.cancel();
        assert_eq!(editor.state(), "cancelled");
    }
}
