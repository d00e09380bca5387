//! Chairside Core - image edit pipeline
//!
//! This crate implements the crop-and-transform pipeline used when a dentist
//! edits an uploaded patient photo (rotate, flip, zoom, crop) and saves it as
//! a new derived file.
//!
//! # Pipeline
//!
//! ```text
//! ImageSource --load_source--> PixelBuffer
//!                                  |
//! EditSession ---------------> render ---> PixelBuffer ---> encode ---> EncodedResult
//! ```
//!
//! [`controller::EditController`] drives the whole flow and owns the session
//! state machine. Storage, database and UI concerns live outside this crate.

pub mod config;
pub mod controller;
pub mod decode;
pub mod encode;
pub mod error;
pub mod retry;
pub mod session;
pub mod transform;

pub use config::EditorConfig;
pub use controller::{load_source, EditController, LoadTicket, SavedEdit};
pub use controller::{ImageSource, SourceLoader};
pub use decode::{decode_image, DecodeError, PixelBuffer};
pub use encode::{encode, EncodeError, EncodedResult, SAVE_QUALITY, THUMBNAIL_QUALITY};
pub use error::{EditError, EditorState};
pub use retry::{retry, RetryPolicy, Sleeper};
pub use session::EditSession;
pub use transform::{compute_rotated_bounds, render, CropRect, RenderError};
