//! Errors surfaced by the edit controller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::transform::RenderError;

/// Where an editor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorState {
    /// No session.
    Idle,
    /// Session opened, source image loading.
    Editing,
    /// Source decoded, controls live.
    Ready,
    /// Render and encode in flight.
    Saving,
    /// Result handed to the caller.
    Saved,
    /// Discarded by the user.
    Cancelled,
}

impl EditorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, EditorState::Saved | EditorState::Cancelled)
    }
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorState::Idle => "idle",
            EditorState::Editing => "editing",
            EditorState::Ready => "ready",
            EditorState::Saving => "saving",
            EditorState::Saved => "saved",
            EditorState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Anything that can go wrong while opening, editing or saving an image.
#[derive(Debug, Error)]
pub enum EditError {
    /// The source image could not be fetched or decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The edit could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The rendered edit could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The operation is not allowed in the current state.
    #[error("Cannot {action} while the editor is {state}")]
    InvalidState {
        action: &'static str,
        state: EditorState,
    },

    /// Save was requested without a usable crop area.
    #[error("Select an area to crop before saving")]
    NoCropSelection,

    /// A load finished after its session was cancelled or replaced.
    #[error("The edit session was closed before the image finished loading")]
    Cancelled,
}
