//! Browser implementations of the loader and sleeper seams.
//!
//! Source images are fetched with `window.fetch`. When the host provides a
//! URL resolver (for example one that asks blob storage for a fresh signed
//! download URL) it is called before every attempt.

use std::time::Duration;

use async_trait::async_trait;
use chairside_core::retry::Sleeper;
use chairside_core::{DecodeError, SourceLoader};
use js_sys::{Function, Promise, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Fetches source bytes over HTTP(S).
pub struct FetchLoader {
    resolver: Option<Function>,
}

impl FetchLoader {
    pub fn new(resolver: Option<Function>) -> Self {
        Self { resolver }
    }

    /// Run the resolver, which may return a string or a Promise of one.
    async fn resolve(&self, url: &str) -> Result<String, DecodeError> {
        let Some(resolver) = &self.resolver else {
            return Ok(url.to_string());
        };

        let returned = resolver
            .call1(&JsValue::NULL, &JsValue::from_str(url))
            .map_err(|e| DecodeError::Resolve(describe(&e)))?;
        let resolved = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| DecodeError::Resolve(describe(&e)))?;

        resolved
            .as_string()
            .ok_or_else(|| DecodeError::Resolve("resolver did not return a URL string".into()))
    }
}

#[async_trait(?Send)]
impl SourceLoader for FetchLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DecodeError> {
        let url = self.resolve(url).await?;
        let window =
            web_sys::window().ok_or_else(|| DecodeError::Fetch("no window available".into()))?;

        let response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(|e| DecodeError::Fetch(describe(&e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| DecodeError::Fetch("fetch did not return a Response".into()))?;

        if !response.ok() {
            return Err(DecodeError::Http {
                status: response.status(),
            });
        }

        let body = response
            .array_buffer()
            .map_err(|e| DecodeError::Fetch(describe(&e)))?;
        let buffer = JsFuture::from(body)
            .await
            .map_err(|e| DecodeError::Fetch(describe(&e)))?;

        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// Sleeps with `setTimeout`.
pub struct TimeoutSleeper;

#[async_trait(?Send)]
impl Sleeper for TimeoutSleeper {
    async fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}
