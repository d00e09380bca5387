//! The edit session controller.
//!
//! # States
//!
//! ```text
//! Idle -> Editing -> Ready -> Saving -> Saved
//!            |         ^        |
//!            |         +--------+   (render/encode failure)
//!            v
//!          Idle  (load failed after retries)
//!
//! any non-terminal state -> Cancelled
//! ```
//!
//! Loading the source is the only suspension point. It is split into
//! [`EditController::begin_load`] and [`EditController::finish_load`] so a
//! host that shares the controller (e.g. behind `Rc<RefCell<_>>`) does not
//! hold a borrow across the await. A load that finishes after the session was
//! cancelled or replaced is discarded.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodeError, PixelBuffer};
use crate::encode::{encode, encode_thumbnail, EncodeError, EncodedResult};
use crate::error::{EditError, EditorState};
use crate::retry::{retry, RetryPolicy, Sleeper};
use crate::session::EditSession;
use crate::transform::render_with;

/// Where the image being edited comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A URL, typically pointing at blob storage.
    Url(String),
    /// Bytes of a file the user picked locally.
    Bytes(Vec<u8>),
}

/// Fetches remote source bytes.
///
/// Implementations resolve storage URLs to a fresh download URL on every
/// call, so a retry never reuses an expired signature.
#[async_trait(?Send)]
pub trait SourceLoader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DecodeError>;
}

/// Handle for an in-flight load, returned by [`EditController::begin_load`].
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    pub source: ImageSource,
}

/// A saved edit together with its grid thumbnail.
#[derive(Debug, Clone)]
pub struct SavedEdit {
    pub image: EncodedResult,
    pub thumbnail: EncodedResult,
}

/// Fetch (with retry) and decode a source image.
///
/// Local bytes are decoded directly. URLs are fetched through `loader`; both
/// the fetch and the decode sit inside the retry loop because a truncated
/// download only shows up as a decode failure.
pub async fn load_source(
    source: &ImageSource,
    loader: &dyn SourceLoader,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
) -> Result<PixelBuffer, DecodeError> {
    match source {
        ImageSource::Bytes(bytes) => decode_image(bytes),
        ImageSource::Url(url) => {
            retry(policy, sleeper, |attempt| {
                debug!(attempt, url = %url, "Fetching source image");
                async move {
                    let bytes = loader.fetch(url).await?;
                    decode_image(&bytes)
                }
            })
            .await
        }
    }
}

/// Owns one edit interaction at a time.
#[derive(Debug)]
pub struct EditController {
    config: EditorConfig,
    state: EditorState,
    source: Option<ImageSource>,
    image: Option<PixelBuffer>,
    session: Option<EditSession>,
    generation: u64,
}

impl Default for EditController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            state: EditorState::Idle,
            source: None,
            image: None,
            session: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// The live session, present only while `Ready` (or `Saving`).
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Mutable access to the session for interactive edits.
    ///
    /// # Errors
    ///
    /// `EditError::InvalidState` unless the editor is `Ready`.
    pub fn session_mut(&mut self) -> Result<&mut EditSession, EditError> {
        let state = self.state;
        match (state, self.session.as_mut()) {
            (EditorState::Ready, Some(session)) => Ok(session),
            _ => Err(EditError::InvalidState {
                action: "edit",
                state,
            }),
        }
    }

    /// Start a new session for `source`, discarding any previous one.
    pub fn open(&mut self, source: ImageSource) {
        self.discard();
        self.source = Some(source);
        self.transition(EditorState::Editing);
    }

    /// Take a ticket for loading the pending source.
    ///
    /// # Errors
    ///
    /// `EditError::InvalidState` unless the editor is `Editing`.
    pub fn begin_load(&self) -> Result<LoadTicket, EditError> {
        match (&self.state, &self.source) {
            (EditorState::Editing, Some(source)) => Ok(LoadTicket {
                generation: self.generation,
                source: source.clone(),
            }),
            _ => Err(EditError::InvalidState {
                action: "load",
                state: self.state,
            }),
        }
    }

    /// Complete a load started with [`begin_load`](Self::begin_load).
    ///
    /// On success a fresh session covering the whole image is created and the
    /// editor becomes `Ready`. On failure it returns to `Idle`.
    ///
    /// # Errors
    ///
    /// - `EditError::Cancelled` if the session was cancelled or replaced
    ///   while loading; the result is dropped
    /// - `EditError::Decode` if loading failed
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<PixelBuffer, DecodeError>,
    ) -> Result<(), EditError> {
        if ticket.generation != self.generation || self.state != EditorState::Editing {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale source load"
            );
            return Err(EditError::Cancelled);
        }

        match result {
            Ok(image) => {
                self.session = Some(EditSession::with_zoom_range(
                    image.width,
                    image.height,
                    self.config.min_zoom,
                    self.config.max_zoom,
                ));
                debug!(width = image.width, height = image.height, "Source image decoded");
                self.image = Some(image);
                self.transition(EditorState::Ready);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Source image could not be loaded");
                self.source = None;
                self.transition(EditorState::Idle);
                Err(err.into())
            }
        }
    }

    /// Fetch, decode and enter `Ready` in one call.
    pub async fn load(
        &mut self,
        loader: &dyn SourceLoader,
        sleeper: &dyn Sleeper,
    ) -> Result<(), EditError> {
        let ticket = self.begin_load()?;
        let result = load_source(&ticket.source, loader, sleeper, &self.config.retry).await;
        self.finish_load(ticket, result)
    }

    /// Render and encode the current edit at `quality`.
    ///
    /// On success the editor is `Saved` and the source image is released.
    /// On failure it goes back to `Ready` with the session untouched, so the
    /// user can adjust and try again.
    pub fn save(&mut self, quality: f32) -> Result<EncodedResult, EditError> {
        self.save_as(|buffer| encode(buffer, quality))
    }

    /// Save at the configured quality and also produce a thumbnail.
    pub fn save_with_thumbnail(&mut self) -> Result<SavedEdit, EditError> {
        let quality = self.config.save_quality;
        let edge = self.config.thumbnail_edge;
        let thumbnail_quality = self.config.thumbnail_quality;
        self.save_as(|buffer| {
            Ok(SavedEdit {
                image: encode(buffer, quality)?,
                thumbnail: encode_thumbnail(buffer, edge, thumbnail_quality)?,
            })
        })
    }

    fn save_as<T>(
        &mut self,
        encode_output: impl FnOnce(&PixelBuffer) -> Result<T, EncodeError>,
    ) -> Result<T, EditError> {
        let state = self.state;
        let (image, session) = match (&self.image, &self.session) {
            (Some(image), Some(session)) if state == EditorState::Ready => (image, session),
            _ => {
                return Err(EditError::InvalidState {
                    action: "save",
                    state,
                })
            }
        };
        if !session.has_crop_selection() {
            return Err(EditError::NoCropSelection);
        }

        debug!(from = %state, to = %EditorState::Saving, "Editor state change");
        self.state = EditorState::Saving;

        let crop = session.crop_rect();
        let rotation = session.rotation_degrees();
        let result = render_with(image, session, &self.config.render_options())
            .map_err(EditError::from)
            .and_then(|output| encode_output(&output).map_err(EditError::from));

        match result {
            Ok(value) => {
                info!(crop = %crop, rotation, "Edit saved");
                self.discard();
                self.transition(EditorState::Saved);
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "Save failed, returning to editor");
                self.transition(EditorState::Ready);
                Err(err)
            }
        }
    }

    /// Abandon the current session. Has no effect when idle or finished.
    pub fn cancel(&mut self) {
        if matches!(self.state, EditorState::Idle) || self.state.is_terminal() {
            return;
        }
        self.discard();
        self.transition(EditorState::Cancelled);
    }

    /// Drop the source and session and invalidate in-flight loads.
    fn discard(&mut self) {
        if let Some(image) = self.image.as_mut() {
            image.release();
        }
        self.image = None;
        self.session = None;
        self.source = None;
        self.generation = self.generation.wrapping_add(1);
    }

    fn transition(&mut self, next: EditorState) {
        debug!(from = %self.state, to = %next, "Editor state change");
        self.state = next;
    }
}
